use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// The elementwise activation applied after a layer's affine transform.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Identity, the raw affine output is passed through.
    #[default]
    None,
    /// Rectified linear unit: `max(x, 0)`.
    Relu,
    /// Logistic function: `1 / (1 + e^-x)`.
    Sigmoid,
    /// Hyperbolic tangent.
    Tanh,
}

use Activation::*;

fn sigmoid(x: f32) -> f32 {
    1. / (1. + (-x).exp())
}

impl Activation {
    /// Evaluates the activation at `x`.
    pub fn f(&self, x: f32) -> f32 {
        match self {
            None => x,
            Relu => x.max(0.),
            Sigmoid => sigmoid(x),
            Tanh => x.tanh(),
        }
    }

    /// Evaluates the derivative of the activation at `x`.
    ///
    /// ReLU is not differentiable at 0, its derivative is taken to be 0 there.
    pub fn df(&self, x: f32) -> f32 {
        match self {
            None => 1.,
            Relu => {
                if x > 0. {
                    1.
                } else {
                    0.
                }
            }
            Sigmoid => {
                let s = sigmoid(x);
                s * (1. - s)
            }
            Tanh => 1. - x.tanh().powi(2),
        }
    }

    /// Applies the activation to every entry of `z`.
    pub fn apply(&self, z: ArrayView1<f32>) -> Array1<f32> {
        z.mapv(|x| self.f(x))
    }

    /// Applies the activation in place, reusing `z`'s buffer.
    pub fn apply_into(&self, z: Array1<f32>) -> Array1<f32> {
        match self {
            None => z,
            _ => z.mapv_into(|x| self.f(x)),
        }
    }

    /// Evaluates the derivative at every entry of `z`.
    pub fn derivative(&self, z: ArrayView1<f32>) -> Array1<f32> {
        z.mapv(|x| self.df(x))
    }
}
