use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::error::LayoutError;
use crate::types::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Wall,
    Empty,
    Dot,
    PowerPellet,
    OpenSpace,
}

impl Cell {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '#' => Some(Self::Wall),
            '_' => Some(Self::Empty),
            '.' => Some(Self::Dot),
            'o' => Some(Self::PowerPellet),
            ' ' => Some(Self::OpenSpace),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Wall => '#',
            Self::Empty => '_',
            Self::Dot => '.',
            Self::PowerPellet => 'o',
            Self::OpenSpace => ' ',
        }
    }

    pub fn is_collectible(self) -> bool {
        matches!(self, Self::Dot | Self::PowerPellet)
    }
}

/// Fixed-shape maze. Only collectible cells ever change, and only to `OpenSpace`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, LayoutError> {
        let Some(first) = rows.first() else {
            return Err(LayoutError::Empty);
        };
        let expected = first.as_ref().chars().count();
        if expected == 0 {
            return Err(LayoutError::Empty);
        }

        let mut cells = Vec::with_capacity(expected * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != expected {
                return Err(LayoutError::Ragged {
                    row: y,
                    expected,
                    found,
                });
            }
            for (x, ch) in row.chars().enumerate() {
                let cell = Cell::from_char(ch).ok_or(LayoutError::UnknownCell { ch, x, y })?;
                cells.push(cell);
            }
        }

        Ok(Self {
            width: expected as i32,
            height: rows.len() as i32,
            cells,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: Vec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index_of(&self, pos: Vec2) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some((pos.y * self.width + pos.x) as usize)
    }

    pub fn cell_at(&self, pos: Vec2) -> Option<Cell> {
        self.index_of(pos).map(|idx| self.cells[idx])
    }

    pub fn is_walkable(&self, pos: Vec2) -> bool {
        self.cell_at(pos).map(|cell| cell != Cell::Wall).unwrap_or(false)
    }

    /// Eats whatever collectible sits at `pos` and reports what it was.
    pub fn consume(&mut self, pos: Vec2) -> Option<Cell> {
        let idx = self.index_of(pos)?;
        let cell = self.cells[idx];
        if !cell.is_collectible() {
            return None;
        }
        self.cells[idx] = Cell::OpenSpace;
        Some(cell)
    }

    pub fn has_remaining_collectibles(&self) -> bool {
        self.cells.iter().any(|cell| cell.is_collectible())
    }

    pub fn remaining_collectibles(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_collectible()).count()
    }

    pub fn collectible_cells(&self) -> Vec<Vec2> {
        self.positions()
            .filter(|pos| self.cell_at(*pos).map(Cell::is_collectible).unwrap_or(false))
            .collect()
    }

    pub fn tiles(&self) -> Vec<String> {
        self.cells
            .chunks(self.width as usize)
            .map(|row| row.iter().map(|cell| cell.as_char()).collect())
            .collect()
    }

    fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Vec2::new(x, y)))
    }
}

/// Flood fill over walkable cells from `start`.
pub fn reachable_cells(grid: &Grid, start: Vec2) -> HashSet<Vec2> {
    let mut out = HashSet::new();
    if !grid.is_walkable(start) {
        return out;
    }

    let mut queue = VecDeque::new();
    out.insert(start);
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        for next in [
            Vec2::new(pos.x - 1, pos.y),
            Vec2::new(pos.x + 1, pos.y),
            Vec2::new(pos.x, pos.y - 1),
            Vec2::new(pos.x, pos.y + 1),
        ] {
            if !grid.is_walkable(next) {
                continue;
            }
            if out.insert(next) {
                queue.push_back(next);
            }
        }
    }

    out
}
