use tracing::{debug, info, trace, warn};

use crate::config::EngineConfig;
use crate::constants::{tick_interval_ms, STARTING_LEVEL};
use crate::error::EngineError;
use crate::high_score::HighScoreStore;
use crate::rng::RandomSource;
use crate::types::{
    Direction, GameState, GameSummary, GhostMode, GhostView, PlayerView, RuntimeEvent, Snapshot,
    Vec2,
};
use crate::world::{reachable_cells, Grid};

mod collision;
mod movement;
mod power;
mod timer;
mod utils;

use self::timer::Deadline;
use self::utils::legal_ghost_directions;

#[derive(Clone, Debug, Default)]
struct SessionStats {
    dots: u32,
    pellets: u32,
    ghosts: u32,
    lives_lost: u32,
}

#[derive(Clone, Debug)]
struct PlayerInternal {
    view: PlayerView,
    desired_dir: Direction,
}

#[derive(Clone, Debug)]
struct GhostInternal {
    view: GhostView,
}

pub struct GameEngine {
    pub config: EngineConfig,

    canonical: Grid,
    grid: Grid,
    rng: Box<dyn RandomSource + Send>,
    high_scores: Box<dyn HighScoreStore + Send>,
    player: PlayerInternal,
    ghosts: Vec<GhostInternal>,
    pending_dir: Option<Direction>,
    power_timer: Deadline,
    events: Vec<RuntimeEvent>,
    stats: SessionStats,

    state: GameState,
    score: u32,
    level: u32,
    lives: u32,
    elapsed_ms: u64,
    tick_counter: u64,
    torn_down: bool,
}

impl GameEngine {
    pub fn new(
        mut config: EngineConfig,
        rng: Box<dyn RandomSource + Send>,
        high_scores: Box<dyn HighScoreStore + Send>,
    ) -> Result<Self, EngineError> {
        let canonical = Grid::parse(config.layout.as_slice())?;
        if !canonical.is_walkable(config.player_spawn) {
            return Err(EngineError::SpawnBlocked {
                what: "player".to_string(),
                x: config.player_spawn.x,
                y: config.player_spawn.y,
            });
        }
        if config.ghost_spawns.is_empty() {
            return Err(EngineError::NoGhostSpawns);
        }
        for spawn in &config.ghost_spawns {
            if !canonical.is_walkable(Vec2::new(spawn.x, spawn.y)) {
                return Err(EngineError::SpawnBlocked {
                    what: format!("{} ghost", spawn.color),
                    x: spawn.x,
                    y: spawn.y,
                });
            }
        }

        let reachable = reachable_cells(&canonical, config.player_spawn);
        let unreachable = canonical
            .collectible_cells()
            .iter()
            .filter(|pos| !reachable.contains(pos))
            .count();
        if unreachable > 0 {
            warn!(unreachable, "layout has collectibles the player cannot reach");
        }
        if config.starting_lives == 0 {
            warn!("starting lives of 0 raised to 1");
            config.starting_lives = 1;
        }

        let player = spawn_player(config.player_spawn);
        let ghosts = spawn_ghosts(&config);
        let lives = config.starting_lives;
        Ok(Self {
            grid: canonical.clone(),
            canonical,
            rng,
            high_scores,
            player,
            ghosts,
            pending_dir: None,
            power_timer: Deadline::default(),
            events: Vec::new(),
            stats: SessionStats::default(),
            state: GameState::Start,
            score: 0,
            level: STARTING_LEVEL,
            lives,
            elapsed_ms: 0,
            tick_counter: 0,
            torn_down: false,
            config,
        })
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn tick_interval_ms(&self) -> u64 {
        tick_interval_ms(self.level, self.config.min_tick_ms)
    }

    /// Stores the direction; it is picked up at the start of the next playing tick.
    pub fn request_direction(&mut self, dir: Direction) {
        if dir == Direction::None {
            return;
        }
        self.pending_dir = Some(dir);
    }

    pub fn request_direction_str(&mut self, raw: &str) {
        match Direction::parse_move(raw) {
            Some(dir) => self.request_direction(dir),
            None => trace!(input = raw, "ignoring unrecognized direction"),
        }
    }

    pub fn toggle_play_pause(&mut self) {
        if self.torn_down {
            return;
        }
        match self.state {
            GameState::Start | GameState::Paused | GameState::LevelComplete => {
                self.set_state(GameState::Playing)
            }
            GameState::Playing => self.set_state(GameState::Paused),
            GameState::GameOver => debug!("play/pause ignored after game over; reset first"),
        }
    }

    /// Full reset: score, level, lives, maze and actors back to a fresh game.
    pub fn reset(&mut self) {
        if self.torn_down {
            return;
        }
        self.power_timer.cancel();
        self.grid = self.canonical.clone();
        self.score = 0;
        self.level = STARTING_LEVEL;
        self.lives = self.config.starting_lives;
        self.stats = SessionStats::default();
        self.tick_counter = 0;
        self.reset_actors();
        self.set_state(GameState::Start);
        info!("game reset");
    }

    /// Cancels the power-up deadline and freezes the session for good.
    pub fn teardown(&mut self) {
        self.power_timer.cancel();
        self.pending_dir = None;
        self.torn_down = true;
        debug!("engine torn down");
    }

    pub fn step(&mut self, dt_ms: u64) {
        if self.torn_down {
            return;
        }
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        let now_ms = self.elapsed_ms;
        self.poll_power_timer(now_ms);

        if self.state != GameState::Playing {
            return;
        }
        self.tick_counter += 1;
        if let Some(dir) = self.pending_dir.take() {
            self.player.desired_dir = dir;
        }

        self.update_player(now_ms);
        self.update_ghosts();
        self.resolve_ghost_collisions();
        // a lost life pauses; completion waits for the resume
        if self.state == GameState::Playing {
            self.check_level_complete();
        }
        trace!(
            tick = self.tick_counter,
            score = self.score,
            x = self.player.view.x,
            y = self.player.view.y,
            remaining = self.grid.remaining_collectibles(),
            "tick"
        );
    }

    pub fn build_snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick_counter,
            now_ms: self.elapsed_ms,
            state: self.state,
            score: self.score,
            high_score: self.high_scores.high_score(),
            level: self.level,
            lives: self.lives,
            tick_interval_ms: self.tick_interval_ms(),
            width: self.grid.width(),
            height: self.grid.height(),
            tiles: self.grid.tiles(),
            player: self.player.view.clone(),
            ghosts: self.ghosts.iter().map(|g| g.view.clone()).collect(),
        }
    }

    pub fn drain_events(&mut self) -> Vec<RuntimeEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn build_summary(&self) -> GameSummary {
        GameSummary {
            final_score: self.score,
            level: self.level,
            ticks: self.tick_counter,
            duration_ms: self.elapsed_ms,
            dots_eaten: self.stats.dots,
            pellets_eaten: self.stats.pellets,
            ghosts_eaten: self.stats.ghosts,
            lives_lost: self.stats.lives_lost,
            high_score: self.high_scores.high_score(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    fn set_state(&mut self, to: GameState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        info!(%from, %to, level = self.level, "state changed");
        self.events.push(RuntimeEvent::StateChanged { from, to });
    }

    fn add_score(&mut self, delta: u32) {
        self.score = self.score.saturating_add(delta);
        self.events.push(RuntimeEvent::ScoreChanged {
            score: self.score,
            delta,
        });
    }

    /// Player and every ghost back to their spawn cells, power-up gone.
    fn reset_actors(&mut self) {
        self.end_power_up();
        self.player = spawn_player(self.config.player_spawn);
        self.ghosts = spawn_ghosts(&self.config);
        self.pending_dir = None;
    }

    fn check_level_complete(&mut self) {
        if self.grid.has_remaining_collectibles() {
            return;
        }
        self.set_state(GameState::LevelComplete);
        self.level = self.level.saturating_add(1);
        self.events.push(RuntimeEvent::LevelUp { level: self.level });
        info!(
            level = self.level,
            score = self.score,
            tick_ms = self.tick_interval_ms(),
            "level complete"
        );
        self.grid = self.canonical.clone();
        self.reset_actors();
        self.set_state(GameState::Playing);
    }
}

fn spawn_player(spawn: Vec2) -> PlayerInternal {
    PlayerInternal {
        view: PlayerView {
            x: spawn.x,
            y: spawn.y,
            dir: Direction::Right,
            powered_up: false,
            power_until: None,
        },
        desired_dir: Direction::Right,
    }
}

fn spawn_ghosts(config: &EngineConfig) -> Vec<GhostInternal> {
    config
        .ghost_spawns
        .iter()
        .enumerate()
        .map(|(idx, spawn)| GhostInternal {
            view: GhostView {
                id: format!("ghost{}", idx + 1),
                color: spawn.color,
                x: spawn.x,
                y: spawn.y,
                dir: Direction::Up,
                mode: GhostMode::Scatter,
                eaten: false,
            },
        })
        .collect()
}
