// THEORY:
// The `pipeline` module is the top-level API for the recognizer. It wires the
// preprocessing stages and the inference engine into a single call:
//
//     RawImageBuffer -> grayscale -> 28×28 grid -> centered grid -> features -> network
//
// Every stage borrows its input and returns a new owned value; nothing is
// cached between calls and the only shared state is the immutable
// `NetworkWeights` behind an `Arc`. A `DigitClassifier` is therefore cheap to
// clone and safe to use from as many threads or tasks as the caller likes.

use crate::core_modules::centering::{self, Shift};
use crate::core_modules::error::PreconditionResult;
use crate::core_modules::grayscale::to_grayscale;
use crate::core_modules::grid_manager::{self, DigitGrid, FeatureVector};
use crate::core_modules::network::{InferenceEngine, NetworkWeights};
use crate::core_modules::raw_image::RawImageBuffer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

// Re-export key data structures for the public API.
pub use crate::core_modules::network::SoftmaxMode;
pub use crate::core_modules::prediction::PredictionVector;

/// Configuration for the classifier and its worker pool.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Literal exp-then-divide softmax, or the max-subtracted variant.
    pub softmax: SoftmaxMode,
    /// Worker tasks in a `ClassifierPool`. `None` uses one per CPU.
    pub workers: Option<usize>,
}

/// Everything preprocessing produces for one canvas.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    /// The centered 28×28 grid the features were flattened from.
    pub grid: DigitGrid,
    /// The recentering offset that was applied.
    pub shift: Shift,
    pub features: FeatureVector,
}

/// The result of classifying one canvas.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub prediction: PredictionVector,
    /// Index of the most probable digit.
    pub digit: usize,
    pub shift: Shift,
    /// No ink was found; the prediction only reflects the network's biases.
    pub blank_canvas: bool,
}

/// Preprocessor and inference engine composed into one pipeline.
#[derive(Debug, Clone)]
pub struct DigitClassifier {
    engine: InferenceEngine,
}

impl DigitClassifier {
    pub fn new(config: &ClassifierConfig, weights: Arc<NetworkWeights>) -> Self {
        Self {
            engine: InferenceEngine::new(weights, config.softmax),
        }
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    /// Turns a raw canvas into the network's input.
    pub fn preprocess(&self, buffer: &RawImageBuffer<'_>) -> PreconditionResult<Preprocessed> {
        preprocess(buffer)
    }

    pub fn classify(&self, buffer: &RawImageBuffer<'_>) -> PreconditionResult<Classification> {
        let Preprocessed {
            grid,
            shift,
            features,
        } = preprocess(buffer)?;

        let blank_canvas = grid.is_blank();
        if blank_canvas {
            warn!(
                width = buffer.width(),
                height = buffer.height(),
                "blank canvas; prediction reflects biases only"
            );
        }

        let prediction = self.engine.predict(&features)?;
        let digit = prediction.top_class();
        debug!(digit, confidence = prediction.confidence(), "classified canvas");

        Ok(Classification {
            prediction,
            digit,
            shift,
            blank_canvas,
        })
    }
}

/// Grayscale, downsample, center and flatten a raw canvas.
pub fn preprocess(buffer: &RawImageBuffer<'_>) -> PreconditionResult<Preprocessed> {
    let gray = to_grayscale(buffer);
    let reduced = grid_manager::downsample(&gray)?;
    let shift = centering::shift(&reduced);
    let grid = centering::apply_shift(&reduced, shift);
    let features = grid_manager::flatten(&grid);
    Ok(Preprocessed {
        grid,
        shift,
        features,
    })
}
