use std::path::PathBuf;

use clap::Parser;
use mazemuncher::config::EngineConfig;
use mazemuncher::engine::GameEngine;
use mazemuncher::high_score::{FileHighScoreStore, HighScoreStore, MemoryHighScore};
use mazemuncher::logging::setup_logging;
use mazemuncher::rng::Rng;
use mazemuncher::runtime::GameRuntime;
use mazemuncher::types::{GhostColor, GhostMode, RuntimeEvent, Snapshot};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

/// Terminal driver. Reads one command per line from stdin:
/// `w a s d` (or `up down left right`) to steer, `p` to play/pause,
/// `r` to reset and `q` to quit.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides `startingLives` from the config file.
    #[arg(long)]
    lives: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    high_score_file: Option<PathBuf>,
    /// Print an ASCII frame whenever the snapshot changes.
    #[arg(long)]
    render: bool,
    #[arg(long)]
    json_logs: bool,
}

enum Command {
    Toggle,
    Reset,
    Quit,
    Steer(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "p" | "pause" | "play" => Some(Command::Toggle),
        "r" | "reset" => Some(Command::Reset),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => Some(Command::Steer(trimmed.to_string())),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.json_logs);

    let mut config = match cli.config.as_deref() {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(lives) = cli.lives {
        config.starting_lives = lives;
    }
    let seed = match cli.seed {
        Some(seed) => (seed % u64::from(u32::MAX)) as u32,
        None => rand::random::<u32>(),
    };

    let mut writer = None;
    let high_scores: Box<dyn HighScoreStore + Send> = match cli.high_score_file {
        Some(path) => {
            let mut store = FileHighScoreStore::new(path);
            info!(path = %store.path().display(), best = store.high_score(), "loaded high score");
            writer = Some(store.spawn_writer());
            Box::new(store)
        }
        None => Box::new(MemoryHighScore::default()),
    };

    let engine = GameEngine::new(config, Box::new(Rng::new(seed)), high_scores)?;
    let runtime = GameRuntime::start(engine);
    info!(seed, "press p to start, q to quit");

    let mut events = runtime.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event observer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    if cli.render {
        let mut snapshots = runtime.watch_snapshots();
        tokio::spawn(async move {
            while snapshots.changed().await.is_ok() {
                let frame = render_frame(&snapshots.borrow_and_update());
                println!("{frame}");
            }
        });
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Some(Command::Toggle) => runtime.toggle_play_pause().await,
            Some(Command::Reset) => runtime.reset().await,
            Some(Command::Quit) => break,
            Some(Command::Steer(raw)) => runtime.request_direction_str(&raw).await,
            None => {}
        }
    }

    let summary = runtime.shutdown().await;
    println!("{}", serde_json::to_string(&summary)?);
    if let Some(handle) = writer {
        // the store, and with it the channel sender, went down with the engine
        if let Err(error) = handle.await {
            warn!(%error, "high score writer did not finish cleanly");
        }
    }
    Ok(())
}

fn log_event(event: &RuntimeEvent) {
    match event {
        RuntimeEvent::LifeLost { lives } => info!(lives, "life lost"),
        RuntimeEvent::LevelUp { level } => info!(level, "level up"),
        RuntimeEvent::GameOver { final_score } => info!(final_score, "game over, press r to reset"),
        RuntimeEvent::NewHighScore { score } => info!(score, "new high score"),
        RuntimeEvent::StateChanged { to, .. } => info!(state = %to, "state"),
        _ => {}
    }
}

fn render_frame(snapshot: &Snapshot) -> String {
    let mut rows: Vec<Vec<char>> = snapshot
        .tiles
        .iter()
        .map(|row| row.chars().map(|ch| if ch == '_' { ' ' } else { ch }).collect())
        .collect();
    let mut put = |x: i32, y: i32, ch: char| {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(cell) = rows.get_mut(y as usize).and_then(|row| row.get_mut(x as usize)) {
            *cell = ch;
        }
    };
    for ghost in &snapshot.ghosts {
        if ghost.eaten {
            continue;
        }
        let glyph = match ghost.color {
            GhostColor::Red => 'R',
            GhostColor::Pink => 'P',
            GhostColor::Cyan => 'C',
            GhostColor::Orange => 'O',
        };
        let glyph = if ghost.mode == GhostMode::Frightened {
            glyph.to_ascii_lowercase()
        } else {
            glyph
        };
        put(ghost.x, ghost.y, glyph);
    }
    put(snapshot.player.x, snapshot.player.y, if snapshot.player.powered_up { '@' } else { 'M' });

    let mut out = format!(
        "score {}  high {}  level {}  lives {}  [{}]\n",
        snapshot.score, snapshot.high_score, snapshot.level, snapshot.lives, snapshot.state
    );
    for row in rows {
        out.extend(row);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mazemuncher::rng::ScriptedRng;

    #[test]
    fn parse_command_maps_control_keys() {
        assert!(matches!(parse_command(" p "), Some(Command::Toggle)));
        assert!(matches!(parse_command("R"), Some(Command::Reset)));
        assert!(matches!(parse_command("quit"), Some(Command::Quit)));
        assert!(matches!(parse_command("w"), Some(Command::Steer(raw)) if raw == "w"));
        assert!(parse_command("   ").is_none());
    }

    #[test]
    fn render_frame_draws_actors_over_tiles() {
        let engine = GameEngine::new(
            EngineConfig::default(),
            Box::new(ScriptedRng::first()),
            Box::new(MemoryHighScore::default()),
        )
        .expect("valid");
        let snapshot = engine.build_snapshot();
        let frame = render_frame(&snapshot);
        let lines: Vec<&str> = frame.lines().collect();
        assert!(lines[0].starts_with("score 0"));
        assert_eq!(lines.len(), 1 + snapshot.tiles.len());
        let player_row: Vec<char> = lines[1 + snapshot.player.y as usize].chars().collect();
        assert_eq!(player_row[snapshot.player.x as usize], 'M');
        let ghost_row: Vec<char> = lines[1 + 10].chars().collect();
        assert_eq!(ghost_row[9], 'R');
        assert!(!frame.contains('_'));
    }
}
