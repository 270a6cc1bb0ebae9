pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod high_score;
pub mod logging;
pub mod rng;
pub mod runtime;
pub mod types;
pub mod world;
