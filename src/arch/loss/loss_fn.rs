use ndarray::{Array1, ArrayView1, Zip};
use serde::{Deserialize, Serialize};

use crate::{MlErr, Result, arch::activations::Activation};

/// The loss functions a `Model` can be scored with.
///
/// `LogLoss` keeps the sign it accumulates with, `Σ t·ln(r) + (1 - t)·ln(1 - r)`, which is the
/// log-likelihood and thus the negative of the usual cross-entropy. Training always descends
/// `objective`, which flips that sign back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    /// `Σ (r - t)²`.
    LeastSquares,
    /// `Σ t·ln(r) + (1 - t)·ln(1 - r)`, for a sigmoid output layer.
    LogLoss,
}

impl Loss {
    /// Scores a prediction against its targets.
    ///
    /// Both views must have the same length.
    pub fn score(&self, result: ArrayView1<f32>, targets: ArrayView1<f32>) -> f32 {
        match self {
            Loss::LeastSquares => Zip::from(&result)
                .and(&targets)
                .fold(0., |acc, &r, &t| acc + (r - t).powi(2)),
            Loss::LogLoss => Zip::from(&result)
                .and(&targets)
                .fold(0., |acc, &r, &t| acc + log_likelihood(r, t)),
        }
    }

    /// The value training minimizes: the score for `LeastSquares` and its negation for
    /// `LogLoss`.
    pub fn objective(&self, result: ArrayView1<f32>, targets: ArrayView1<f32>) -> f32 {
        match self {
            Loss::LeastSquares => self.score(result, targets),
            Loss::LogLoss => -self.score(result, targets),
        }
    }

    /// Computes the derivative of `objective` with respect to the output layer's
    /// pre-activation values.
    ///
    /// # Arguments
    /// * `result` - The output of the last layer.
    /// * `targets` - The expected output.
    /// * `derivative` - The output activation's derivative at the pre-activation values.
    pub fn output_delta(
        &self,
        result: ArrayView1<f32>,
        targets: ArrayView1<f32>,
        derivative: ArrayView1<f32>,
    ) -> Array1<f32> {
        match self {
            Loss::LeastSquares => {
                Zip::from(&result)
                    .and(&targets)
                    .and(&derivative)
                    .map_collect(|&r, &t, &d| 2. * (r - t) * d)
            }
            // d/dz of the cross-entropy through a sigmoid collapses to `r - t`, avoiding the
            // division by `r·(1 - r)` once the output saturates.
            Loss::LogLoss => &result - &targets,
        }
    }

    /// The factor turning `output_delta` into the residual `r - t` at an identity output.
    ///
    /// Stepping by the scaled gradient at unit rate is the classic backpropagation update,
    /// which descends `Σ (r - t)² / 2` for `LeastSquares`.
    pub fn residual_scale(&self) -> f32 {
        match self {
            Loss::LeastSquares => 0.5,
            Loss::LogLoss => 1.,
        }
    }

    /// Checks that `activation` is a valid output activation for this loss.
    ///
    /// # Returns
    /// `MlErr::InvalidArgument` when pairing `LogLoss` with anything but a sigmoid output.
    pub fn check_output(&self, activation: Activation) -> Result<()> {
        match (self, activation) {
            (Loss::LogLoss, Activation::Sigmoid) | (Loss::LeastSquares, _) => Ok(()),
            (Loss::LogLoss, _) => Err(MlErr::InvalidArgument(
                "log loss requires a sigmoid output layer",
            )),
        }
    }
}

/// A single log loss term. Terms with a zero coefficient are skipped, so a saturated but
/// correct output scores 0 instead of `0 · ln(0)`.
fn log_likelihood(r: f32, t: f32) -> f32 {
    let mut term = 0.;
    if t != 0. {
        term += t * r.ln();
    }
    if t != 1. {
        term += (1. - t) * (1. - r).ln();
    }

    term
}
