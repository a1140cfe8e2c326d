// THEORY:
// A digit drawn in a corner of the canvas looks nothing like the centered
// digits the network was trained on. Centering moves the ink's center of mass
// onto the grid's geometric center before inference.
//
// The center of mass here is unweighted: every cell with any ink counts once,
// regardless of how dark it is. The mean position is floored, then offset by
// half the grid, giving an integer shift. Cells shifted in from outside the grid
// are blank.
//
// Coordinates follow the grid's `[row][col]` indexing: `dx` moves along the
// outer (row) axis, `dy` along the inner (column) axis.

use crate::core_modules::grid_manager::{DigitGrid, GRID_SIZE};
use serde::Serialize;
use tracing::debug;

/// Integer offset from the grid center to the ink's center of mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Shift {
    pub dx: i32,
    pub dy: i32,
}

impl Shift {
    pub fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Computes how far the ink's center of mass sits from the grid center.
/// A blank grid has no center of mass and yields a zero shift.
pub fn shift(grid: &DigitGrid) -> Shift {
    let mut sum_x = 0usize;
    let mut sum_y = 0usize;
    let mut count = 0usize;

    for (x, row) in grid.cells.iter().enumerate() {
        for (y, &cell) in row.iter().enumerate() {
            if cell > 0.0 {
                sum_x += x;
                sum_y += y;
                count += 1;
            }
        }
    }

    if count == 0 {
        return Shift::default();
    }

    // Indices are non-negative, so integer division is the floor of the mean.
    let half = (GRID_SIZE / 2) as i32;
    Shift {
        dx: (sum_x / count) as i32 - half,
        dy: (sum_y / count) as i32 - half,
    }
}

/// Re-centers the ink mass onto the grid center.
pub fn centralize(grid: &DigitGrid) -> DigitGrid {
    apply_shift(grid, shift(grid))
}

/// Samples `grid` at every coordinate displaced by `offset`; coordinates that
/// fall outside the grid read as blank.
pub fn apply_shift(grid: &DigitGrid, offset: Shift) -> DigitGrid {
    debug!(dx = offset.dx, dy = offset.dy, "centering ink mass");
    if offset.is_zero() {
        return *grid;
    }

    let mut centered = DigitGrid::default();
    for x in 0..GRID_SIZE {
        for y in 0..GRID_SIZE {
            if let Some(value) = sample(grid, x as i32 + offset.dx, y as i32 + offset.dy) {
                centered.set(x, y, value);
            }
        }
    }
    centered
}

#[inline]
fn sample(grid: &DigitGrid, x: i32, y: i32) -> Option<f32> {
    let size = GRID_SIZE as i32;
    if (0..size).contains(&x) && (0..size).contains(&y) {
        Some(grid.get(x as usize, y as usize))
    } else {
        None
    }
}
