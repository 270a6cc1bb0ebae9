use strum::IntoEnumIterator;

use crate::types::{Direction, Vec2};
use crate::world::Grid;

/// Walkable directions out of `pos`, minus the way back, in Up/Down/Left/Right order.
pub(super) fn legal_ghost_directions(grid: &Grid, pos: Vec2, facing: Direction) -> Vec<Direction> {
    let reverse = facing.opposite();
    Direction::iter()
        .filter(|dir| *dir != Direction::None && *dir != reverse)
        .filter(|dir| grid.is_walkable(pos.offset(*dir)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::parse(&[
            "#####", //
            "#. .#", //
            "# # #", //
            "#.  #", //
            "#####",
        ])
        .expect("test layout parses")
    }

    #[test]
    fn legal_directions_exclude_reverse_and_walls() {
        let grid = grid();
        // corner (1,1): open to the right and down
        assert_eq!(
            legal_ghost_directions(&grid, Vec2::new(1, 1), Direction::Right),
            vec![Direction::Down, Direction::Right]
        );
        assert_eq!(
            legal_ghost_directions(&grid, Vec2::new(1, 1), Direction::Up),
            vec![Direction::Right]
        );
        assert_eq!(
            legal_ghost_directions(&grid, Vec2::new(1, 1), Direction::Left),
            vec![Direction::Down]
        );
    }

    #[test]
    fn dead_end_has_no_legal_direction() {
        let grid = Grid::parse(&["###", "# #", "# #", "###"]).expect("parses");
        assert!(legal_ghost_directions(&grid, Vec2::new(1, 1), Direction::Up).is_empty());
        assert_eq!(
            legal_ghost_directions(&grid, Vec2::new(1, 1), Direction::None),
            vec![Direction::Down]
        );
    }
}
