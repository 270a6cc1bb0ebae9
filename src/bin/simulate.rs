use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::Parser;
use mazemuncher::config::EngineConfig;
use mazemuncher::engine::GameEngine;
use mazemuncher::high_score::MemoryHighScore;
use mazemuncher::logging::setup_logging;
use mazemuncher::rng::Rng;
use mazemuncher::types::{Direction, GameState, RuntimeEvent, Snapshot, Vec2};
use mazemuncher::world::Grid;
use serde::Serialize;
use tracing::{error, info, warn};

/// Plays headless games with a random-turning autopilot and checks every
/// snapshot for impossible states.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 3)]
    games: u32,
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u64,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides `startingLives` from the config file.
    #[arg(long)]
    lives: Option<u32>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
    #[arg(long)]
    json_logs: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GameResultLine {
    game: u32,
    seed: u32,
    outcome: String,
    final_score: u32,
    level: u32,
    ticks: u64,
    duration_ms: u64,
    dots_eaten: u32,
    pellets_eaten: u32,
    ghosts_eaten: u32,
    lives_lost: u32,
    levels_cleared: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct GameRunResult {
    result: GameResultLine,
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary {
    started_at_ms: u64,
    finished_at_ms: u64,
    game_count: usize,
    anomaly_count: usize,
    average_score: u32,
    best_score: u32,
    outcome_counts: BTreeMap<String, usize>,
    games: Vec<GameResultLine>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.json_logs);

    let mut config = match cli.config.as_deref() {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(lives) = cli.lives {
        config.starting_lives = lives;
    }
    let base_seed = match cli.seed {
        Some(seed) => normalize_seed(seed),
        None => rand::random::<u32>(),
    };
    let started_at_ms = now_ms();
    let mut results = Vec::new();
    let mut has_anomaly = false;

    for game in 0..cli.games.max(1) {
        let seed = base_seed.wrapping_add(game);
        info!(game, seed, "game started");
        let run = run_game(&config, game, seed, cli.max_ticks)?;
        for anomaly in &run.anomaly_records {
            warn!(game, seed, tick = anomaly.tick, message = %anomaly.message, "anomaly detected");
        }
        has_anomaly |= !run.result.anomalies.is_empty();
        info!(
            game,
            seed,
            outcome = %run.result.outcome,
            score = run.result.final_score,
            level = run.result.level,
            ticks = run.result.ticks,
            "game finished"
        );
        println!("{}", serde_json::to_string(&run.result)?);
        results.push(run);
    }

    let summary = build_run_summary(started_at_ms, now_ms(), results);
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            error!(path = %path.display(), %error, "failed to write summary");
            std::process::exit(2);
        }
    }
    info!(
        games = summary.game_count,
        anomalies = summary.anomaly_count,
        average_score = summary.average_score,
        best_score = summary.best_score,
        "run finished"
    );

    if has_anomaly {
        std::process::exit(1);
    }
    Ok(())
}

fn run_game(config: &EngineConfig, game: u32, seed: u32, max_ticks: u64) -> anyhow::Result<GameRunResult> {
    let mut engine = GameEngine::new(
        config.clone(),
        Box::new(Rng::new(seed)),
        Box::new(MemoryHighScore::default()),
    )
    .context("engine rejected config")?;
    let mut pilot = Autopilot::new(seed ^ 0x9e37_79b9);
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut levels_cleared = 0u32;
    let mut previous: Option<Snapshot> = None;

    engine.toggle_play_pause();
    while !engine.is_over() {
        if engine.state() == GameState::Paused {
            engine.toggle_play_pause();
        }
        let snapshot = engine.build_snapshot();
        if let Some(dir) = pilot.steer(engine.grid(), &snapshot) {
            engine.request_direction(dir);
        }

        engine.step(engine.tick_interval_ms());
        let snapshot = engine.build_snapshot();
        for event in engine.drain_events() {
            if let RuntimeEvent::LevelUp { .. } = event {
                levels_cleared += 1;
            }
        }
        for message in collect_snapshot_anomalies(engine.grid(), previous.as_ref(), &snapshot, config) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        if snapshot.tick >= max_ticks {
            break;
        }
        previous = Some(snapshot);
    }

    let summary = engine.build_summary();
    let outcome = if engine.is_over() { "game_over" } else { "tick_limit" };
    Ok(GameRunResult {
        result: GameResultLine {
            game,
            seed,
            outcome: outcome.to_string(),
            final_score: summary.final_score,
            level: summary.level,
            ticks: summary.ticks,
            duration_ms: summary.duration_ms,
            dots_eaten: summary.dots_eaten,
            pellets_eaten: summary.pellets_eaten,
            ghosts_eaten: summary.ghosts_eaten,
            lives_lost: summary.lives_lost,
            levels_cleared,
            anomalies,
        },
        anomaly_records,
    })
}

/// Keeps its heading until blocked, occasionally turning at random.
struct Autopilot {
    rng: Rng,
    heading: Direction,
}

impl Autopilot {
    fn new(seed: u32) -> Self {
        Self {
            rng: Rng::new(seed),
            heading: Direction::Right,
        }
    }

    fn steer(&mut self, grid: &Grid, snapshot: &Snapshot) -> Option<Direction> {
        let pos = Vec2::new(snapshot.player.x, snapshot.player.y);
        let open: Vec<Direction> = [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
            .into_iter()
            .filter(|dir| grid.is_walkable(pos.offset(*dir)))
            .collect();
        if open.is_empty() {
            return None;
        }
        let blocked = !open.contains(&self.heading);
        if !blocked && !self.rng.bool(0.2) {
            return None;
        }
        let idx = self.rng.int(0, open.len() as i32 - 1) as usize;
        self.heading = open[idx];
        Some(self.heading)
    }
}

fn collect_snapshot_anomalies(
    grid: &Grid,
    previous: Option<&Snapshot>,
    snapshot: &Snapshot,
    config: &EngineConfig,
) -> Vec<String> {
    let mut anomalies = Vec::new();
    let player = Vec2::new(snapshot.player.x, snapshot.player.y);
    if !grid.is_walkable(player) {
        anomalies.push(format!("player inside wall at ({},{})", player.x, player.y));
    }
    for ghost in &snapshot.ghosts {
        if !grid.is_walkable(Vec2::new(ghost.x, ghost.y)) {
            anomalies.push(format!("ghost inside wall: {}", ghost.id));
        }
    }
    if snapshot.player.powered_up != snapshot.player.power_until.is_some() {
        anomalies.push("power flag and deadline disagree".to_string());
    }
    if snapshot.tick_interval_ms < config.min_tick_ms {
        anomalies.push(format!("tick interval below floor: {}", snapshot.tick_interval_ms));
    }
    if let Some(prev) = previous {
        if snapshot.score < prev.score {
            anomalies.push(format!("score decreased: {} -> {}", prev.score, snapshot.score));
        }
        if snapshot.lives > prev.lives {
            anomalies.push(format!("lives increased: {} -> {}", prev.lives, snapshot.lives));
        }
        if snapshot.level < prev.level {
            anomalies.push(format!("level decreased: {} -> {}", prev.level, snapshot.level));
        }
        if prev.lives.saturating_sub(snapshot.lives) > 1 {
            anomalies.push("more than one life lost in a tick".to_string());
        }
    }
    anomalies
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn build_run_summary(started_at_ms: u64, finished_at_ms: u64, runs: Vec<GameRunResult>) -> RunSummary {
    let anomaly_count = runs.iter().map(|run| run.anomaly_records.len()).sum();
    let games: Vec<GameResultLine> = runs.into_iter().map(|run| run.result).collect();
    let mut outcome_counts = BTreeMap::new();
    for game in &games {
        *outcome_counts.entry(game.outcome.clone()).or_insert(0) += 1;
    }
    let total: u64 = games.iter().map(|game| u64::from(game.final_score)).sum();
    let average_score = if games.is_empty() {
        0
    } else {
        (total / games.len() as u64) as u32
    };
    RunSummary {
        started_at_ms,
        finished_at_ms,
        game_count: games.len(),
        anomaly_count,
        average_score,
        best_score: games.iter().map(|game| game.final_score).max().unwrap_or(0),
        outcome_counts,
        games,
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn normalize_seed(seed: u64) -> u32 {
    (seed % u64::from(u32::MAX)) as u32
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
