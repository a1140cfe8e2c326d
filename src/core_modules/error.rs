// THEORY:
// Every failure the core can produce is an integration mistake: a buffer whose
// length does not match its declared dimensions, a canvas the 28×28 grid cannot
// tile, or weights whose shapes do not chain. None of them are retryable and
// none of them allow a partial answer, so they share one error type that the
// caller receives synchronously.
//
// A blank canvas is not represented here. It is a valid input that
// yields an uninformative prediction, and is reported through logging and the
// `Classification::blank_canvas` flag instead.

use thiserror::Error;

/// A malformed input or an inconsistent set of weights.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("Pixel buffer length mismatch: expected {expected} bytes for {width}x{height} RGBA, got {actual}")]
    BufferLength {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Image dimensions {width}x{height} overflow the addressable buffer size")]
    DimensionsOverflow { width: usize, height: usize },
    #[error("Empty image: {width}x{height}")]
    EmptyImage { width: usize, height: usize },
    #[error("Canvas must be square, got {width}x{height}")]
    NonSquare { width: usize, height: usize },
    #[error("Canvas size {size} is not divisible by the {grid}x{grid} grid")]
    NotGridDivisible { size: usize, grid: usize },
    #[error("Dense layer input length mismatch: weights expect {expected} inputs, got {actual}")]
    InputLength { expected: usize, actual: usize },
    #[error("Weight matrix row {row} has {actual} columns, but the layer has {expected} biases")]
    RaggedWeights {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Flat weight matrix has {actual} values, expected {expected}")]
    WeightCount { expected: usize, actual: usize },
    #[error("Layer {layer} takes {actual} inputs, expected {expected}")]
    LayerInputs {
        layer: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Output layer produces {actual} classes, expected {expected}")]
    OutputClasses { expected: usize, actual: usize },
}

/// Result type for the preprocessing and inference stages.
pub type PreconditionResult<T> = Result<T, PreconditionError>;
