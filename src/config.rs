use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CANONICAL_LAYOUT, GHOST_SPAWNS, MIN_TICK_MS, PLAYER_SPAWN, POWER_DURATION_MS, STARTING_LIVES,
};
use crate::error::ConfigError;
use crate::types::{GhostColor, Vec2};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostSpawn {
    pub color: GhostColor,
    pub x: i32,
    pub y: i32,
}

/// Tunables for one play session. Every field falls back to the stock maze and
/// rules, so a config file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub layout: Vec<String>,
    pub player_spawn: Vec2,
    pub ghost_spawns: Vec<GhostSpawn>,
    pub starting_lives: u32,
    pub power_duration_ms: u64,
    pub min_tick_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: CANONICAL_LAYOUT.iter().map(|row| row.to_string()).collect(),
            player_spawn: PLAYER_SPAWN,
            ghost_spawns: GHOST_SPAWNS
                .iter()
                .map(|(color, pos)| GhostSpawn {
                    color: *color,
                    x: pos.x,
                    y: pos.y,
                })
                .collect(),
            starting_lives: STARTING_LIVES,
            power_duration_ms: POWER_DURATION_MS,
            min_tick_ms: MIN_TICK_MS,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
