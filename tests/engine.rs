use mazemuncher::config::{EngineConfig, GhostSpawn};
use mazemuncher::engine::GameEngine;
use mazemuncher::high_score::MemoryHighScore;
use mazemuncher::rng::ScriptedRng;
use mazemuncher::types::{GameState, GhostColor, GhostMode, RuntimeEvent, Vec2};
use pretty_assertions::assert_eq;

// One corridor: the player starts on the left, a single ghost on the right
// walks straight at it.
const WITH_PELLET: [&str; 3] = ["#########", "# ..o.. #", "#########"];
const DOTS_ONLY: [&str; 3] = ["#########", "# ..... #", "#########"];

fn corridor(layout: &[&str], lives: u32, best: u32) -> GameEngine {
    let config = EngineConfig {
        layout: layout.iter().map(|row| row.to_string()).collect(),
        player_spawn: Vec2::new(1, 1),
        ghost_spawns: vec![GhostSpawn {
            color: GhostColor::Red,
            x: 7,
            y: 1,
        }],
        starting_lives: lives,
        ..EngineConfig::default()
    };
    let mut engine = GameEngine::new(
        config,
        Box::new(ScriptedRng::first()),
        Box::new(MemoryHighScore::new(best)),
    )
    .expect("corridor layout is valid");
    engine.toggle_play_pause();
    engine
}

// The ghost waits at a fork beside the only dot: the first pick sends it left
// onto the dot, the second sends it right, away from the player.
const LAST_DOT_FORK: [&str; 3] = ["######", "# .  #", "######"];

fn last_dot_fork(lives: u32) -> GameEngine {
    let config = EngineConfig {
        layout: LAST_DOT_FORK.iter().map(|row| row.to_string()).collect(),
        player_spawn: Vec2::new(1, 1),
        ghost_spawns: vec![GhostSpawn {
            color: GhostColor::Cyan,
            x: 3,
            y: 1,
        }],
        starting_lives: lives,
        ..EngineConfig::default()
    };
    let mut engine = GameEngine::new(
        config,
        Box::new(ScriptedRng::new(vec![0, 1])),
        Box::new(MemoryHighScore::default()),
    )
    .expect("fork layout is valid");
    engine.toggle_play_pause();
    engine.drain_events();
    engine
}

fn tick(engine: &mut GameEngine, times: usize) {
    for _ in 0..times {
        engine.step(engine.tick_interval_ms());
    }
}

#[test]
fn first_tick_eats_a_dot() {
    let mut engine = corridor(&WITH_PELLET, 3, 0);
    engine.drain_events();
    tick(&mut engine, 1);

    let snapshot = engine.build_snapshot();
    assert_eq!(snapshot.score, 10);
    assert_eq!((snapshot.player.x, snapshot.player.y), (2, 1));
    assert_eq!((snapshot.ghosts[0].x, snapshot.ghosts[0].y), (6, 1));
    assert_eq!(snapshot.tiles[1], "#  .o.. #");
    assert_eq!(
        engine.drain_events(),
        vec![
            RuntimeEvent::DotEaten { x: 2, y: 1 },
            RuntimeEvent::ScoreChanged { score: 10, delta: 10 },
        ]
    );
}

#[test]
fn powered_player_eats_the_ghost_it_meets() {
    let mut engine = corridor(&WITH_PELLET, 3, 0);
    tick(&mut engine, 2);
    engine.drain_events();
    tick(&mut engine, 1);

    let snapshot = engine.build_snapshot();
    assert_eq!(snapshot.score, 10 + 10 + 50 + 200);
    assert!(snapshot.player.powered_up);
    assert!(snapshot.ghosts[0].eaten);
    assert_eq!(snapshot.ghosts[0].mode, GhostMode::Eaten);
    assert_eq!(snapshot.lives, 3);

    let now = snapshot.now_ms;
    assert_eq!(
        engine.drain_events(),
        vec![
            RuntimeEvent::PelletTaken { x: 4, y: 1 },
            RuntimeEvent::ScoreChanged { score: 70, delta: 50 },
            RuntimeEvent::PowerUpActivated { until_ms: now + 8_000 },
            RuntimeEvent::GhostEaten {
                ghost_id: "ghost1".to_string()
            },
            RuntimeEvent::ScoreChanged { score: 270, delta: 200 },
        ]
    );
}

#[test]
fn eating_the_last_collectible_starts_the_next_level() {
    let mut engine = corridor(&WITH_PELLET, 3, 0);
    tick(&mut engine, 5);

    let snapshot = engine.build_snapshot();
    assert_eq!(snapshot.level, 2);
    assert_eq!(snapshot.state, GameState::Playing);
    assert_eq!(snapshot.score, 290);
    assert_eq!(snapshot.tick_interval_ms, 240);
    assert_eq!(snapshot.tiles[1], WITH_PELLET[1]);
    assert_eq!((snapshot.player.x, snapshot.player.y), (1, 1));
    assert!(!snapshot.player.powered_up);
    assert!(!snapshot.ghosts[0].eaten);
    assert!(engine.drain_events().contains(&RuntimeEvent::LevelUp { level: 2 }));
}

#[test]
fn losing_a_life_respawns_actors_and_pauses() {
    let mut engine = corridor(&DOTS_ONLY, 2, 0);
    tick(&mut engine, 3);

    let snapshot = engine.build_snapshot();
    assert_eq!(snapshot.lives, 1);
    assert_eq!(snapshot.state, GameState::Paused);
    assert_eq!(snapshot.score, 30);
    assert_eq!((snapshot.player.x, snapshot.player.y), (1, 1));
    assert_eq!((snapshot.ghosts[0].x, snapshot.ghosts[0].y), (7, 1));
    // eaten dots stay eaten
    assert_eq!(snapshot.tiles[1], "#    .. #");

    // paused ticks change nothing but the clock
    tick(&mut engine, 4);
    assert_eq!(engine.build_snapshot().score, 30);
    assert_eq!(engine.build_snapshot().tick, snapshot.tick);

    engine.toggle_play_pause();
    tick(&mut engine, 1);
    assert_eq!(engine.build_snapshot().state, GameState::Playing);
}

#[test]
fn last_life_ends_the_game_and_records_the_high_score() {
    let mut engine = corridor(&DOTS_ONLY, 1, 10);
    tick(&mut engine, 3);

    assert!(engine.is_over());
    let snapshot = engine.build_snapshot();
    assert_eq!(snapshot.lives, 0);
    assert_eq!(snapshot.high_score, 30);

    let events = engine.drain_events();
    let tail = events[events.len() - 4..].to_vec();
    assert_eq!(
        tail,
        vec![
            RuntimeEvent::LifeLost { lives: 0 },
            RuntimeEvent::StateChanged {
                from: GameState::Playing,
                to: GameState::GameOver,
            },
            RuntimeEvent::GameOver { final_score: 30 },
            RuntimeEvent::NewHighScore { score: 30 },
        ]
    );

    // ticks after game over are inert until a reset
    tick(&mut engine, 3);
    assert_eq!(engine.build_snapshot().tick, snapshot.tick);
    engine.reset();
    let fresh = engine.build_snapshot();
    assert_eq!(fresh.state, GameState::Start);
    assert_eq!((fresh.score, fresh.lives, fresh.high_score), (0, 1, 30));
    assert_eq!(fresh.tiles[1], DOTS_ONLY[1]);
}

#[test]
fn snapshot_serializes_for_observers() {
    let engine = corridor(&WITH_PELLET, 3, 0);
    let value = serde_json::to_value(engine.build_snapshot()).expect("snapshot serializes");
    assert_eq!(value["state"], "playing");
    assert_eq!(value["tickIntervalMs"], 260);
    assert_eq!(value["player"]["poweredUp"], false);
    assert_eq!(value["ghosts"][0]["type"], "red");
    assert_eq!(value["ghosts"][0]["mode"], "scatter");
    assert_eq!(value["tiles"][1], "# ..o.. #");
}

#[test]
fn life_lost_on_the_last_dot_pauses_before_the_level_completes() {
    let mut engine = last_dot_fork(3);
    tick(&mut engine, 1);

    let snapshot = engine.build_snapshot();
    assert_eq!(snapshot.state, GameState::Paused);
    assert_eq!((snapshot.level, snapshot.lives, snapshot.score), (1, 2, 10));
    assert_eq!(snapshot.tiles[1], "#    #");
    assert_eq!(
        engine.drain_events(),
        vec![
            RuntimeEvent::DotEaten { x: 2, y: 1 },
            RuntimeEvent::ScoreChanged { score: 10, delta: 10 },
            RuntimeEvent::LifeLost { lives: 2 },
            RuntimeEvent::StateChanged {
                from: GameState::Playing,
                to: GameState::Paused,
            },
        ]
    );

    // still paused, still level 1
    tick(&mut engine, 2);
    assert_eq!(engine.state(), GameState::Paused);
    assert_eq!(engine.build_snapshot().level, 1);

    engine.toggle_play_pause();
    engine.drain_events();
    tick(&mut engine, 1);
    let snapshot = engine.build_snapshot();
    assert_eq!(snapshot.state, GameState::Playing);
    assert_eq!((snapshot.level, snapshot.lives, snapshot.score), (2, 2, 10));
    assert_eq!(snapshot.tiles[1], LAST_DOT_FORK[1]);
    assert_eq!(
        engine.drain_events(),
        vec![
            RuntimeEvent::StateChanged {
                from: GameState::Playing,
                to: GameState::LevelComplete,
            },
            RuntimeEvent::LevelUp { level: 2 },
            RuntimeEvent::StateChanged {
                from: GameState::LevelComplete,
                to: GameState::Playing,
            },
        ]
    );
}

#[test]
fn game_over_on_the_last_dot_does_not_advance_the_level() {
    let mut engine = last_dot_fork(1);
    tick(&mut engine, 1);

    assert!(engine.is_over());
    let snapshot = engine.build_snapshot();
    assert_eq!((snapshot.level, snapshot.lives), (1, 0));
    assert!(!engine
        .drain_events()
        .iter()
        .any(|event| matches!(event, RuntimeEvent::LevelUp { .. })));
}
