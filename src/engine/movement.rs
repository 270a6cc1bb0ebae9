use super::*;

use crate::constants::{DOT_SCORE, POWER_PELLET_SCORE};
use crate::world::Cell;

impl GameEngine {
    pub(super) fn update_player(&mut self, now_ms: u64) {
        let dir = self.player.desired_dir;
        if dir == Direction::None {
            return;
        }
        let from = Vec2::new(self.player.view.x, self.player.view.y);
        let next = from.offset(dir);
        if !self.grid.is_walkable(next) {
            return;
        }
        self.player.view.x = next.x;
        self.player.view.y = next.y;
        self.player.view.dir = dir;
        self.apply_player_pickup(next, now_ms);
    }

    fn apply_player_pickup(&mut self, pos: Vec2, now_ms: u64) {
        match self.grid.consume(pos) {
            Some(Cell::Dot) => {
                self.stats.dots += 1;
                self.events.push(RuntimeEvent::DotEaten { x: pos.x, y: pos.y });
                self.add_score(DOT_SCORE);
            }
            Some(Cell::PowerPellet) => {
                self.stats.pellets += 1;
                self.events.push(RuntimeEvent::PelletTaken { x: pos.x, y: pos.y });
                self.add_score(POWER_PELLET_SCORE);
                self.activate_power_up(now_ms);
            }
            _ => {}
        }
    }

    pub(super) fn update_ghosts(&mut self) {
        for idx in 0..self.ghosts.len() {
            if self.ghosts[idx].view.eaten {
                continue;
            }
            let dir = self.choose_ghost_direction(idx);
            if dir == Direction::None {
                continue;
            }
            let from = Vec2::new(self.ghosts[idx].view.x, self.ghosts[idx].view.y);
            let next = from.offset(dir);
            if !self.grid.is_walkable(next) {
                continue;
            }
            self.ghosts[idx].view.x = next.x;
            self.ghosts[idx].view.y = next.y;
            self.ghosts[idx].view.dir = dir;
        }
    }

    /// Keeps going straight while it can, picks a random non-reversing exit
    /// otherwise, and only turns back at a dead end.
    pub(super) fn choose_ghost_direction(&mut self, ghost_idx: usize) -> Direction {
        let ghost = &self.ghosts[ghost_idx].view;
        let pos = Vec2::new(ghost.x, ghost.y);
        let facing = ghost.dir;

        let options = legal_ghost_directions(&self.grid, pos, facing);
        if options.contains(&facing) {
            return facing;
        }
        if !options.is_empty() {
            let pick = self.rng.pick_index(options.len());
            return options[pick.min(options.len() - 1)];
        }

        let back = facing.opposite();
        if back != Direction::None && self.grid.is_walkable(pos.offset(back)) {
            return back;
        }
        Direction::None
    }
}
