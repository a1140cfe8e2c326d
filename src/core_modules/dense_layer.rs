// THEORY:
// A dense layer is a matrix–vector product plus a bias, pushed through an
// activation. The weight matrix is stored `inputs × outputs`, row-major, so
// output `j` reads column `j`: `activation(b[j] + Σᵢ x[i]·W[i][j])`.
//
// Weights, activations and sums are `f64`, the precision the weights are
// trained and exported in.
//
// Shapes are checked twice: once when a `LayerWeights` is assembled (every row
// must be as wide as the bias vector) and once per call (the input must be as
// long as the matrix is tall). A mismatch is never truncated or padded.

use crate::core_modules::error::{PreconditionError, PreconditionResult};

/// The nonlinearity applied to each output unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// `max(0, v)`, used by the hidden layers.
    Relu,
    /// `exp(v)`, used by the output layer so that softmax only has to divide.
    Exp,
    /// No activation; the raw logit.
    Identity,
}

impl Activation {
    #[inline]
    pub fn apply(self, v: f64) -> f64 {
        match self {
            Activation::Relu => v.max(0.0),
            Activation::Exp => v.exp(),
            Activation::Identity => v,
        }
    }
}

/// Weights and biases of one fully connected layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerWeights {
    inputs: usize,
    outputs: usize,
    /// Row-major `inputs × outputs`.
    weights: Vec<f64>,
    biases: Vec<f64>,
}

impl LayerWeights {
    /// Builds a layer from a nested `inputs × outputs` matrix and its biases.
    pub fn new(matrix: Vec<Vec<f64>>, biases: Vec<f64>) -> PreconditionResult<Self> {
        let outputs = biases.len();
        let inputs = matrix.len();
        let mut weights = Vec::with_capacity(inputs * outputs);
        for (row, values) in matrix.into_iter().enumerate() {
            if values.len() != outputs {
                return Err(PreconditionError::RaggedWeights {
                    row,
                    expected: outputs,
                    actual: values.len(),
                });
            }
            weights.extend(values);
        }
        Ok(Self {
            inputs,
            outputs,
            weights,
            biases,
        })
    }

    /// Builds a layer from an already flattened row-major matrix.
    pub fn from_flat(
        inputs: usize,
        weights: Vec<f64>,
        biases: Vec<f64>,
    ) -> PreconditionResult<Self> {
        let outputs = biases.len();
        if weights.len() != inputs * outputs {
            return Err(PreconditionError::WeightCount {
                expected: inputs * outputs,
                actual: weights.len(),
            });
        }
        Ok(Self {
            inputs,
            outputs,
            weights,
            biases,
        })
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    /// `W[i][j]`.
    #[inline]
    pub fn weight(&self, i: usize, j: usize) -> f64 {
        self.weights[i * self.outputs + j]
    }
}

/// Applies one dense layer to `input`.
pub fn dense_layer(
    input: &[f64],
    layer: &LayerWeights,
    activation: Activation,
) -> PreconditionResult<Vec<f64>> {
    if input.len() != layer.inputs {
        return Err(PreconditionError::InputLength {
            expected: layer.inputs,
            actual: input.len(),
        });
    }

    // Accumulate row by row so the weight matrix is read sequentially; each
    // output still sums its terms in input order, starting from the bias.
    let mut sums = layer.biases.clone();
    for (row, &x) in layer.weights.chunks_exact(layer.outputs.max(1)).zip(input) {
        for (sum, &w) in sums.iter_mut().zip(row) {
            *sum += x * w;
        }
    }

    Ok(sums.into_iter().map(|v| activation.apply(v)).collect())
}
