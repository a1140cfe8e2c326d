// THEORY:
// The `grid_manager` owns the fixed 28×28 lattice the network was trained on.
// Its job is to slice an arbitrary (square, 28-divisible) grayscale plane into
// that lattice of `Chunk`s and collapse each one into a single cell.
//
// Key architectural principles:
// 1.  **Explicit preconditions**: The canvas must be non-empty, square and
//     exactly divisible by 28. Anything else is rejected up front instead of
//     silently reading out of bounds or dropping a ragged border.
// 2.  **Polarity inversion**: Each cell is `1 - mean(block)`. The grayscale plane
//     is "paper" (white = 1.0); the grid is "ink" (stroke = positive, blank = 0).
//     Every downstream stage (centering, the network) relies on blank being
//     exactly zero.
// 3.  **Flattening**: The grid is handed to the network as a row-major vector of
//     784 features.

use crate::core_modules::chunk::chunk::Chunk;
use crate::core_modules::error::{PreconditionError, PreconditionResult};
use crate::core_modules::grayscale::GrayscaleMatrix;
use tracing::debug;

/// Edge length of the network's input lattice.
pub const GRID_SIZE: usize = 28;
/// Number of input features (`GRID_SIZE * GRID_SIZE`).
pub const FEATURE_LEN: usize = GRID_SIZE * GRID_SIZE;

/// A 28×28 lattice of ink values in [0, 1], indexed `[row][col]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DigitGrid {
    pub cells: [[f32; GRID_SIZE]; GRID_SIZE],
}

impl Default for DigitGrid {
    fn default() -> Self {
        Self {
            cells: [[0.0; GRID_SIZE]; GRID_SIZE],
        }
    }
}

impl DigitGrid {
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.cells[row][col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.cells[row][col] = value;
    }

    /// Number of cells carrying any ink.
    pub fn ink_cells(&self) -> usize {
        self.cells.iter().flatten().filter(|&&v| v > 0.0).count()
    }

    /// True when no cell carries ink.
    pub fn is_blank(&self) -> bool {
        self.ink_cells() == 0
    }
}

/// Row-major network input of exactly `FEATURE_LEN` values.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// Validates the canvas and returns the block edge length in pixels.
pub fn block_size(width: usize, height: usize) -> PreconditionResult<usize> {
    if width == 0 || height == 0 {
        return Err(PreconditionError::EmptyImage { width, height });
    }
    if width != height {
        return Err(PreconditionError::NonSquare { width, height });
    }
    if height % GRID_SIZE != 0 {
        return Err(PreconditionError::NotGridDivisible {
            size: height,
            grid: GRID_SIZE,
        });
    }
    Ok(height / GRID_SIZE)
}

/// Block-averages `matrix` down to the 28×28 lattice, inverting polarity so
/// that ink is positive.
pub fn downsample(matrix: &GrayscaleMatrix) -> PreconditionResult<DigitGrid> {
    let block = block_size(matrix.width, matrix.height)?;
    debug!(
        width = matrix.width,
        height = matrix.height,
        block,
        "downsampling canvas"
    );

    let mut grid = DigitGrid::default();
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let chunk = Chunk::new(matrix, col * block, row * block, block);
            grid.set(row, col, 1.0 - chunk.average_intensity());
        }
    }
    Ok(grid)
}

/// Concatenates the grid's rows into the network's input vector.
pub fn flatten(grid: &DigitGrid) -> FeatureVector {
    FeatureVector(grid.cells.iter().flatten().copied().collect())
}
