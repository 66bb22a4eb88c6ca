//! Grid: the fixed coordinate space ants move on.
//!
//! The grid knows its dimensions and where the nest is. It never stores
//! ants; occupancy belongs to the registry. Once built it is immutable,
//! so any number of agents can read it concurrently.

use crate::error::{ConfigError, Rejection};
use crate::types::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Map symbol for an empty cell.
pub const EMPTY_GLYPH: char = '.';
/// Map symbol for the nest.
pub const NEST_GLYPH: char = 'H';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    nest: Position,
}

impl Grid {
    /// Create a grid with the nest at its center.
    pub fn new(width: i32, height: i32) -> Result<Self, ConfigError> {
        if width < 1 || height < 1 {
            return Err(ConfigError::InvalidGridSize { width, height });
        }
        Ok(Self {
            width,
            height,
            nest: Position::new(width / 2, height / 2),
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn within_bounds(&self, p: Position) -> bool {
        (0..self.width).contains(&p.x) && (0..self.height).contains(&p.y)
    }

    pub fn nest_position(&self) -> Position {
        self.nest
    }

    /// Number of cells an ant may stand on.
    pub fn capacity(&self) -> usize {
        (self.width as usize) * (self.height as usize) - 1
    }

    /// Check the static part of a move: bounds and the nest.
    ///
    /// Occupancy depends on other ants and is checked by the registry.
    pub fn check_enterable(&self, p: Position) -> Result<(), Rejection> {
        if !self.within_bounds(p) {
            return Err(Rejection::OutOfBounds);
        }
        if p == self.nest {
            return Err(Rejection::Nest);
        }
        Ok(())
    }

    /// Render the grid with the given occupants overlaid.
    ///
    /// Later entries win when two occupants share a cell. Out-of-bounds
    /// occupants are skipped.
    pub fn render(&self, occupants: &[(Position, char)]) -> GridView {
        let mut cells =
            vec![vec![EMPTY_GLYPH; self.width as usize]; self.height as usize];
        cells[self.nest.y as usize][self.nest.x as usize] = NEST_GLYPH;

        for &(pos, glyph) in occupants {
            if self.within_bounds(pos) {
                cells[pos.y as usize][pos.x as usize] = glyph;
            }
        }

        GridView {
            rows: cells.into_iter().map(|row| row.into_iter().collect()).collect(),
        }
    }
}

/// A rendered map, one string per row, top row first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridView {
    pub rows: Vec<String>,
}

impl GridView {
    /// Glyph at a cell, if it is on the map.
    pub fn glyph_at(&self, p: Position) -> Option<char> {
        if p.x < 0 || p.y < 0 {
            return None;
        }
        self.rows.get(p.y as usize)?.chars().nth(p.x as usize)
    }

    pub fn count(&self, glyph: char) -> usize {
        self.rows
            .iter()
            .map(|row| row.chars().filter(|&c| c == glyph).count())
            .sum()
    }
}

impl fmt::Display for GridView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let spaced: Vec<String> = row.chars().map(|c| c.to_string()).collect();
            writeln!(f, "{}", spaced.join(" "))?;
        }
        Ok(())
    }
}
