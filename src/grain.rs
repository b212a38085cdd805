//! Grain: one occupied cell. Knows its colour and the fall rule, nothing else.

use crate::grid::Grid;
use crate::surface::Surface;
use rand::Rng;
use ratatui::style::Color;

/// A single sand grain. Its position is wherever the grid holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grain {
    pub color: Color,
}

/// What one application of the fall rule did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fall {
    /// On the floor row; never moves again.
    Settled,
    Straight,
    DownLeft,
    DownRight,
    /// Below and both usable diagonals are occupied.
    Blocked,
}

impl Fall {
    pub fn moved(self) -> bool {
        matches!(self, Self::Straight | Self::DownLeft | Self::DownRight)
    }
}

impl Grain {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    /// Fill the pixel rectangle of grid cell `(column, row)` with this grain's colour.
    pub fn render(&self, surface: &mut dyn Surface, dimension: usize, column: usize, row: usize) {
        let (width, height) = surface.size();
        let cell_w = f64::from(width) / dimension as f64;
        let cell_h = f64::from(height) / dimension as f64;
        surface.fill_rect(
            column as f64 * cell_w,
            row as f64 * cell_h,
            cell_w,
            cell_h,
            self.color,
        );
    }

    /// Try to move the grain at `(column, row)` one row down, straight or diagonally.
    ///
    /// The grid is mutated immediately. When both diagonals are open the side is an
    /// unbiased coin flip from `rng`.
    pub fn attempt_fall<R: Rng>(
        grid: &mut Grid,
        column: usize,
        row: usize,
        rng: &mut R,
    ) -> Fall {
        if row >= grid.last() {
            return Fall::Settled;
        }
        let below = row + 1;
        if grid.is_empty(column, below) {
            grid.move_grain((column, row), (column, below));
            return Fall::Straight;
        }

        // Off-grid diagonals are not candidates.
        let left = column
            .checked_sub(1)
            .filter(|&c| grid.is_empty(c, below));
        let right = Some(column + 1)
            .filter(|&c| c < grid.dimension() && grid.is_empty(c, below));

        let (target, fall) = match (left, right) {
            (Some(l), Some(r)) => {
                if rng.gen_bool(0.5) {
                    (l, Fall::DownLeft)
                } else {
                    (r, Fall::DownRight)
                }
            }
            (Some(l), None) => (l, Fall::DownLeft),
            (None, Some(r)) => (r, Fall::DownRight),
            (None, None) => return Fall::Blocked,
        };
        grid.move_grain((column, row), (target, below));
        fall
    }
}
