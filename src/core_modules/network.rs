// THEORY:
// The inference engine is a fixed three-layer perceptron:
//
//     784 --(W1,B1, ReLU)--> H1 --(W2,B2, ReLU)--> H2 --(W3,B3, exp)--> 10 --> softmax
//
// The output layer exponentiates its logits directly and softmax only divides
// by the sum. This skips the usual max-subtraction, so a logit much above ~709
// overflows `f64::exp` to infinity and the distribution degrades to NaN. That
// is the literal, default behavior. `SoftmaxMode::Stabilized` is the explicit
// opt-in that subtracts the largest logit first.
//
// Features arrive as `f32` and are widened once; every layer and the
// normalization run in `f64`. Only the final probabilities are narrowed.
//
// `NetworkWeights` is validated once at construction so that `predict` can
// only fail on a feature vector of the wrong length. It is immutable and meant
// to be shared behind an `Arc` by every engine in the process.

use crate::core_modules::dense_layer::{Activation, LayerWeights, dense_layer};
use crate::core_modules::error::{PreconditionError, PreconditionResult};
use crate::core_modules::grid_manager::{FEATURE_LEN, FeatureVector};
use crate::core_modules::prediction::{NUM_CLASSES, PredictionVector};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

/// How the output layer's logits are turned into probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftmaxMode {
    /// `exp(logit)` then divide by the sum. Overflows for large logits.
    #[default]
    Literal,
    /// `exp(logit - max_logit)` then divide by the sum.
    Stabilized,
}

/// The three layers of the digit network, shape-checked to chain
/// `784 -> H1 -> H2 -> 10`.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkWeights {
    layers: [LayerWeights; 3],
}

impl NetworkWeights {
    pub fn new(
        layer1: LayerWeights,
        layer2: LayerWeights,
        layer3: LayerWeights,
    ) -> PreconditionResult<Self> {
        let mut expected_inputs = FEATURE_LEN;
        for (index, layer) in [&layer1, &layer2, &layer3].into_iter().enumerate() {
            if layer.inputs() != expected_inputs {
                return Err(PreconditionError::LayerInputs {
                    layer: index + 1,
                    expected: expected_inputs,
                    actual: layer.inputs(),
                });
            }
            expected_inputs = layer.outputs();
        }
        if layer3.outputs() != NUM_CLASSES {
            return Err(PreconditionError::OutputClasses {
                expected: NUM_CLASSES,
                actual: layer3.outputs(),
            });
        }
        Ok(Self {
            layers: [layer1, layer2, layer3],
        })
    }

    pub fn layer(&self, index: usize) -> &LayerWeights {
        &self.layers[index]
    }

    /// Sizes of the two hidden layers.
    pub fn hidden_sizes(&self) -> (usize, usize) {
        (self.layers[0].outputs(), self.layers[1].outputs())
    }
}

/// Divides every element by the sum of all elements. The inputs are expected
/// to be already exponentiated.
pub fn softmax(values: [f64; NUM_CLASSES]) -> PredictionVector {
    let sum: f64 = values.iter().sum();
    if !sum.is_finite() || sum == 0.0 {
        warn!(sum, "softmax normalizer is degenerate; probabilities will not be finite");
    }
    PredictionVector::new(values.map(|v| (v / sum) as f32))
}

/// Runs the fixed network over feature vectors.
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    weights: Arc<NetworkWeights>,
    mode: SoftmaxMode,
}

impl InferenceEngine {
    pub fn new(weights: Arc<NetworkWeights>, mode: SoftmaxMode) -> Self {
        Self { weights, mode }
    }

    pub fn weights(&self) -> &Arc<NetworkWeights> {
        &self.weights
    }

    pub fn mode(&self) -> SoftmaxMode {
        self.mode
    }

    pub fn predict(&self, features: &FeatureVector) -> PreconditionResult<PredictionVector> {
        self.predict_slice(features.as_slice())
    }

    /// Layer 1 (ReLU), layer 2 (ReLU), layer 3 (exp), softmax.
    pub fn predict_slice(&self, features: &[f32]) -> PreconditionResult<PredictionVector> {
        let [layer1, layer2, layer3] = &self.weights.layers;
        let input: Vec<f64> = features.iter().map(|&v| f64::from(v)).collect();
        let hidden = dense_layer(&input, layer1, Activation::Relu)?;
        let hidden = dense_layer(&hidden, layer2, Activation::Relu)?;

        let exponentiated = match self.mode {
            SoftmaxMode::Literal => dense_layer(&hidden, layer3, Activation::Exp)?,
            SoftmaxMode::Stabilized => {
                let logits = dense_layer(&hidden, layer3, Activation::Identity)?;
                let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                logits.into_iter().map(|v| (v - max).exp()).collect()
            }
        };

        let values: [f64; NUM_CLASSES] = exponentiated.as_slice().try_into().map_err(|_| {
            PreconditionError::OutputClasses {
                expected: NUM_CLASSES,
                actual: exponentiated.len(),
            }
        })?;
        Ok(softmax(values))
    }
}
