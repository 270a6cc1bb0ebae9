use super::*;

use crate::constants::GHOST_SCORE;

impl GameEngine {
    /// Player-ghost contact after both have moved. A powered player eats every
    /// live ghost on its cell; otherwise the first contact costs one life and
    /// nothing else is checked this tick.
    pub(super) fn resolve_ghost_collisions(&mut self) {
        let (px, py) = (self.player.view.x, self.player.view.y);
        for idx in 0..self.ghosts.len() {
            let ghost = &self.ghosts[idx].view;
            if ghost.eaten || ghost.x != px || ghost.y != py {
                continue;
            }
            if self.player.view.powered_up {
                self.eat_ghost(idx);
            } else {
                self.lose_life();
                return;
            }
        }
    }

    fn eat_ghost(&mut self, idx: usize) {
        let ghost = &mut self.ghosts[idx].view;
        ghost.eaten = true;
        ghost.mode = GhostMode::Eaten;
        let ghost_id = ghost.id.clone();
        debug!(ghost = %ghost_id, "ghost eaten");
        self.stats.ghosts += 1;
        self.events.push(RuntimeEvent::GhostEaten { ghost_id });
        self.add_score(GHOST_SCORE);
    }

    fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.stats.lives_lost += 1;
        self.events.push(RuntimeEvent::LifeLost { lives: self.lives });
        info!(lives = self.lives, score = self.score, "life lost");

        if self.lives == 0 {
            self.finish_game();
            return;
        }
        self.reset_actors();
        self.set_state(GameState::Paused);
    }

    fn finish_game(&mut self) {
        self.power_timer.cancel();
        self.pending_dir = None;
        self.set_state(GameState::GameOver);
        self.events.push(RuntimeEvent::GameOver {
            final_score: self.score,
        });

        let best = self.high_scores.high_score();
        if self.score > best {
            self.high_scores.set_high_score(self.score);
            self.events
                .push(RuntimeEvent::NewHighScore { score: self.score });
            info!(score = self.score, previous = best, "new high score");
        }
        info!(
            score = self.score,
            level = self.level,
            ticks = self.tick_counter,
            "game over"
        );
    }
}
