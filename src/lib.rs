// THEORY:
// This file is the main entry point for the `digit_vision` library crate.
//
// The public surface is the `DigitClassifier` (one canvas in, one prediction
// out), its `ClassifierPool` for concurrent independent requests, and the data
// types that flow through them. The individual preprocessing and inference
// stages live in `core_modules` and stay public so each one can be exercised
// and tested on its own.

pub mod core_modules;
pub mod parallel_pipeline;
pub mod pipeline;

pub use crate::core_modules::error::PreconditionError;
pub use crate::core_modules::network::{InferenceEngine, NetworkWeights};
pub use crate::core_modules::raw_image::{OwnedImage, RawImageBuffer};
pub use crate::parallel_pipeline::{ClassifierPool, PoolError};
pub use crate::pipeline::{
    Classification, ClassifierConfig, DigitClassifier, PredictionVector, SoftmaxMode,
};
