use super::*;

impl GameEngine {
    /// Starts or restarts the power-up window. Only the latest deadline counts.
    pub(super) fn activate_power_up(&mut self, now_ms: u64) {
        let until_ms = now_ms.saturating_add(self.config.power_duration_ms);
        self.power_timer.schedule(until_ms);
        self.player.view.powered_up = true;
        self.player.view.power_until = Some(until_ms);
        for ghost in &mut self.ghosts {
            if !ghost.view.eaten {
                ghost.view.mode = GhostMode::Frightened;
            }
        }
        self.events.push(RuntimeEvent::PowerUpActivated { until_ms });
        debug!(until_ms, "power-up activated");
    }

    /// Runs on every step, paused or not, so the window keeps draining.
    pub(super) fn poll_power_timer(&mut self, now_ms: u64) {
        if self.power_timer.fire_if_due(now_ms) {
            self.end_power_up();
        }
    }

    pub(super) fn end_power_up(&mut self) {
        self.power_timer.cancel();
        if !self.player.view.powered_up {
            return;
        }
        self.player.view.powered_up = false;
        self.player.view.power_until = None;
        for ghost in &mut self.ghosts {
            if ghost.view.mode == GhostMode::Frightened {
                ghost.view.mode = GhostMode::Scatter;
            }
        }
        self.events.push(RuntimeEvent::PowerUpDeactivated);
        debug!("power-up ended");
    }
}
