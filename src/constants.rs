use crate::types::{GhostColor, Vec2};

pub const BASE_TICK_MS: u64 = 280;
pub const TICK_STEP_PER_LEVEL_MS: u64 = 20;
pub const MIN_TICK_MS: u64 = 60;

pub const DOT_SCORE: u32 = 10;
pub const POWER_PELLET_SCORE: u32 = 50;
pub const GHOST_SCORE: u32 = 200;

pub const POWER_DURATION_MS: u64 = 8_000;
pub const STARTING_LIVES: u32 = 3;
pub const STARTING_LEVEL: u32 = 1;

pub const PLAYER_SPAWN: Vec2 = Vec2 { x: 9, y: 16 };

pub const GHOST_SPAWNS: [(GhostColor, Vec2); 4] = [
    (GhostColor::Red, Vec2 { x: 9, y: 10 }),
    (GhostColor::Pink, Vec2 { x: 8, y: 10 }),
    (GhostColor::Cyan, Vec2 { x: 10, y: 10 }),
    (GhostColor::Orange, Vec2 { x: 12, y: 10 }),
];

/// `#` wall, `_` empty, `.` dot, `o` power pellet, ` ` open space.
pub const CANONICAL_LAYOUT: [&str; 22] = [
    "###################",
    "#........#........#",
    "#o##.###.#.###.##o#",
    "#.##.###.#.###.##.#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.### # ###.####",
    "   #.#       #.#   ",
    "####.# ## ## #.####",
    "    .  #   #  .    ",
    "####.# ##### #.####",
    "   #.#       #.#   ",
    "####.# ##### #.####",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#o.#..... .....#.o#",
    "##.#.#.#####.#.#.##",
    "#....#...#...#....#",
    "#.######.#.######.#",
    "#.................#",
    "###################",
];

pub fn tick_interval_ms(level: u32, min_tick_ms: u64) -> u64 {
    let shrink = TICK_STEP_PER_LEVEL_MS.saturating_mul(level as u64);
    BASE_TICK_MS.saturating_sub(shrink).max(min_tick_ms.max(1))
}
