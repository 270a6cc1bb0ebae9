//! Drives a [`GameEngine`] on a tokio interval and fans its output out to
//! observers: the latest [`Snapshot`] on a watch channel and every
//! [`RuntimeEvent`] on a broadcast channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::engine::GameEngine;
use crate::types::{Direction, GameSummary, RuntimeEvent, Snapshot};

const EVENT_CAPACITY: usize = 256;

pub type SharedEngine = Arc<Mutex<GameEngine>>;

struct Publisher {
    snapshots: watch::Sender<Snapshot>,
    events: broadcast::Sender<RuntimeEvent>,
}

impl Publisher {
    fn publish(&self, engine: &mut GameEngine) {
        for event in engine.drain_events() {
            // no subscribers is fine
            let _ = self.events.send(event);
        }
        self.snapshots.send_replace(engine.build_snapshot());
    }
}

pub struct GameRuntime {
    engine: SharedEngine,
    publisher: Arc<Publisher>,
    snapshot_rx: watch::Receiver<Snapshot>,
    tick_task: JoinHandle<()>,
}

impl GameRuntime {
    /// Takes ownership of the engine and starts ticking it. Must be called
    /// inside a tokio runtime.
    pub fn start(engine: GameEngine) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.build_snapshot());
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let publisher = Arc::new(Publisher {
            snapshots: snapshot_tx,
            events: event_tx,
        });
        let engine = Arc::new(Mutex::new(engine));
        let tick_task = start_tick_loop(engine.clone(), publisher.clone());
        info!("game runtime started");
        Self {
            engine,
            publisher,
            snapshot_rx,
            tick_task,
        }
    }

    pub fn engine(&self) -> SharedEngine {
        self.engine.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn watch_snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RuntimeEvent> {
        self.publisher.events.subscribe()
    }

    pub async fn request_direction(&self, dir: Direction) {
        self.engine.lock().await.request_direction(dir);
    }

    pub async fn request_direction_str(&self, raw: &str) {
        self.engine.lock().await.request_direction_str(raw);
    }

    pub async fn toggle_play_pause(&self) {
        let mut guard = self.engine.lock().await;
        guard.toggle_play_pause();
        self.publisher.publish(&mut guard);
    }

    pub async fn reset(&self) {
        let mut guard = self.engine.lock().await;
        guard.reset();
        self.publisher.publish(&mut guard);
    }

    /// Stops the tick loop and tears the engine down. Returns the session summary.
    pub async fn shutdown(self) -> GameSummary {
        self.tick_task.abort();
        let mut guard = self.engine.lock().await;
        guard.teardown();
        self.publisher.publish(&mut guard);
        info!("game runtime stopped");
        guard.build_summary()
    }
}

/// One step per interval tick. The interval is rebuilt whenever the engine's
/// period changes, which happens on level up and reset. Late ticks are skipped
/// rather than bunched, so steps never overlap or pile up.
fn start_tick_loop(engine: SharedEngine, publisher: Arc<Publisher>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut period_ms = engine.lock().await.tick_interval_ms();
        let mut interval = period_interval(period_ms);
        loop {
            interval.tick().await;
            let next_period_ms = {
                let mut guard = engine.lock().await;
                guard.step(period_ms);
                publisher.publish(&mut guard);
                guard.tick_interval_ms()
            };
            if next_period_ms != period_ms {
                debug!(from = period_ms, to = next_period_ms, "tick period changed");
                period_ms = next_period_ms;
                interval = period_interval(period_ms);
            }
        }
    })
}

fn period_interval(period_ms: u64) -> tokio::time::Interval {
    let period = Duration::from_millis(period_ms.max(1));
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::high_score::MemoryHighScore;
    use crate::rng::ScriptedRng;
    use crate::types::GameState;

    fn runtime() -> GameRuntime {
        let engine = GameEngine::new(
            EngineConfig::default(),
            Box::new(ScriptedRng::first()),
            Box::new(MemoryHighScore::default()),
        )
        .expect("default config is valid");
        GameRuntime::start(engine)
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_on_the_level_cadence() {
        let runtime = runtime();
        runtime.toggle_play_pause().await;
        assert_eq!(runtime.snapshot().state, GameState::Playing);

        tokio::time::sleep(Duration::from_millis(260 * 3 + 10)).await;
        let snapshot = runtime.snapshot();
        assert_eq!(snapshot.tick, 3);
        assert_eq!(snapshot.now_ms, 260 * 3);
        assert!(snapshot.score >= 10);
        runtime.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn observers_receive_events_in_order() {
        let runtime = runtime();
        let mut events = runtime.subscribe();
        runtime.toggle_play_pause().await;
        assert_eq!(
            events.recv().await.expect("state change"),
            RuntimeEvent::StateChanged {
                from: GameState::Start,
                to: GameState::Playing,
            }
        );

        tokio::time::sleep(Duration::from_millis(270)).await;
        assert_eq!(
            events.recv().await.expect("dot"),
            RuntimeEvent::DotEaten { x: 10, y: 16 }
        );
        assert_eq!(
            events.recv().await.expect("score"),
            RuntimeEvent::ScoreChanged { score: 10, delta: 10 }
        );
        runtime.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn paused_game_does_not_advance() {
        let runtime = runtime();
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        let snapshot = runtime.snapshot();
        assert_eq!(snapshot.state, GameState::Start);
        assert_eq!(snapshot.tick, 0);
        assert_eq!(snapshot.score, 0);
        runtime.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_freezes_the_session() {
        let runtime = runtime();
        runtime.toggle_play_pause().await;
        tokio::time::sleep(Duration::from_millis(530)).await;
        let engine = runtime.engine();
        let mut snapshots = runtime.watch_snapshots();

        let summary = runtime.shutdown().await;
        assert_eq!(summary.ticks, 2);
        let frozen = snapshots.borrow_and_update().clone();

        tokio::time::sleep(Duration::from_millis(2_000)).await;
        let mut guard = engine.lock().await;
        guard.toggle_play_pause();
        guard.step(260);
        assert_eq!(guard.build_snapshot(), frozen);
    }
}
