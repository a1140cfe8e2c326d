// THEORY:
// `PredictionVector` is the final product of inference: one probability per
// digit class, index = digit. The top class is derived on demand rather than
// stored, so the two can never disagree.

use serde::Serialize;

/// Number of digit classes.
pub const NUM_CLASSES: usize = 10;

/// Probability per digit class, summing to 1 within floating-point tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionVector {
    probabilities: [f32; NUM_CLASSES],
}

impl PredictionVector {
    pub fn new(probabilities: [f32; NUM_CLASSES]) -> Self {
        Self { probabilities }
    }

    pub fn probabilities(&self) -> &[f32; NUM_CLASSES] {
        &self.probabilities
    }

    pub fn probability(&self, digit: usize) -> f32 {
        self.probabilities[digit]
    }

    pub fn sum(&self) -> f32 {
        self.probabilities.iter().sum()
    }

    /// The most likely digit. Ties go to the lowest index; `NaN` entries never
    /// win.
    pub fn top_class(&self) -> usize {
        let mut best = 0;
        for (digit, &p) in self.probabilities.iter().enumerate().skip(1) {
            if p > self.probabilities[best] || (self.probabilities[best].is_nan() && !p.is_nan()) {
                best = digit;
            }
        }
        best
    }

    /// Probability of the top class.
    pub fn confidence(&self) -> f32 {
        self.probabilities[self.top_class()]
    }
}
