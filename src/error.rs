//! Error types for the fallible edges of the engine: layout parsing, config
//! loading and high-score persistence. Ticking the game itself never fails.

use std::io;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum LayoutError {
    #[error("layout has no rows")]
    Empty,

    #[error("row {row} has width {found}, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown cell character {ch:?} at ({x},{y})")]
    UnknownCell { ch: char, x: usize, y: usize },
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("{what} spawn ({x},{y}) is not a walkable cell")]
    SpawnBlocked { what: String, x: i32, y: i32 },

    #[error("expected at least one ghost spawn")]
    NoGhostSpawns,
}
