use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    pub fn parse_move(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" | "w" => Some(Self::Up),
            "down" | "s" => Some(Self::Down),
            "left" | "a" => Some(Self::Left),
            "right" | "d" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameState {
    Start,
    Playing,
    Paused,
    GameOver,
    LevelComplete,
}

/// Scatter and Frightened share the same wandering policy; only collisions care.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Scatter,
    Frightened,
    Eaten,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GhostColor {
    Red,
    Pink,
    Cyan,
    Orange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step in `dir`; `Direction::None` stays put.
    pub fn offset(self, dir: Direction) -> Self {
        match dir {
            Direction::Up => Self::new(self.x, self.y - 1),
            Direction::Down => Self::new(self.x, self.y + 1),
            Direction::Left => Self::new(self.x - 1, self.y),
            Direction::Right => Self::new(self.x + 1, self.y),
            Direction::None => self,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    #[serde(rename = "poweredUp")]
    pub powered_up: bool,
    #[serde(rename = "powerUntil")]
    pub power_until: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GhostView {
    pub id: String,
    #[serde(rename = "type")]
    pub color: GhostColor,
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub mode: GhostMode,
    pub eaten: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    ScoreChanged {
        score: u32,
        delta: u32,
    },
    DotEaten {
        x: i32,
        y: i32,
    },
    PelletTaken {
        x: i32,
        y: i32,
    },
    PowerUpActivated {
        #[serde(rename = "untilMs")]
        until_ms: u64,
    },
    PowerUpDeactivated,
    GhostEaten {
        #[serde(rename = "ghostId")]
        ghost_id: String,
    },
    LifeLost {
        lives: u32,
    },
    LevelUp {
        level: u32,
    },
    GameOver {
        #[serde(rename = "finalScore")]
        final_score: u32,
    },
    NewHighScore {
        score: u32,
    },
    StateChanged {
        from: GameState,
        to: GameState,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "nowMs")]
    pub now_ms: u64,
    pub state: GameState,
    pub score: u32,
    #[serde(rename = "highScore")]
    pub high_score: u32,
    pub level: u32,
    pub lives: u32,
    #[serde(rename = "tickIntervalMs")]
    pub tick_interval_ms: u64,
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<String>,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    #[serde(rename = "finalScore")]
    pub final_score: u32,
    pub level: u32,
    pub ticks: u64,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    #[serde(rename = "dotsEaten")]
    pub dots_eaten: u32,
    #[serde(rename = "pelletsEaten")]
    pub pellets_eaten: u32,
    #[serde(rename = "ghostsEaten")]
    pub ghosts_eaten: u32,
    #[serde(rename = "livesLost")]
    pub lives_lost: u32,
    #[serde(rename = "highScore")]
    pub high_score: u32,
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn parse_move_accepts_words_and_keys() {
        assert_eq!(Direction::parse_move("up"), Some(Direction::Up));
        assert_eq!(Direction::parse_move(" Left "), Some(Direction::Left));
        assert_eq!(Direction::parse_move("d"), Some(Direction::Right));
        assert_eq!(Direction::parse_move("s"), Some(Direction::Down));
    }

    #[test]
    fn parse_move_rejects_unknown_input() {
        assert_eq!(Direction::parse_move("north"), None);
        assert_eq!(Direction::parse_move(""), None);
        assert_eq!(Direction::parse_move("none"), None);
    }

    #[test]
    fn opposite_is_an_involution() {
        for dir in Direction::iter() {
            assert_eq!(dir.opposite().opposite(), dir);
        }
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
    }

    #[test]
    fn offset_moves_one_cell() {
        let pos = Vec2::new(2, 2);
        assert_eq!(pos.offset(Direction::Up), Vec2::new(2, 1));
        assert_eq!(pos.offset(Direction::Down), Vec2::new(2, 3));
        assert_eq!(pos.offset(Direction::Left), Vec2::new(1, 2));
        assert_eq!(pos.offset(Direction::Right), Vec2::new(3, 2));
        assert_eq!(pos.offset(Direction::None), pos);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let value = serde_json::to_value(RuntimeEvent::GameOver { final_score: 420 })
            .expect("event serializes");
        assert_eq!(value["type"], "game_over");
        assert_eq!(value["finalScore"], 420);

        let value = serde_json::to_value(RuntimeEvent::StateChanged {
            from: GameState::Playing,
            to: GameState::LevelComplete,
        })
        .expect("event serializes");
        assert_eq!(value["to"], "level_complete");
    }

    #[test]
    fn game_state_displays_snake_case() {
        assert_eq!(GameState::GameOver.to_string(), "game_over");
        assert_eq!(GhostColor::Orange.to_string(), "orange");
    }
}
