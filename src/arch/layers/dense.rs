use log::trace;
use ndarray::{Array1, Array2, ArrayView1, s};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Normal;

use crate::{MlErr, Result, arch::activations::Activation};

/// A dense (fully connected) layer: `activation(weights · x + bias)`.
///
/// `weights` has shape `(node_count, fan_in)` and `bias` has length `node_count`, both are
/// mutated only by training.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    fan_in: usize,
    node_count: usize,
    weights: Array2<f32>,
    bias: Array1<f32>,
    activation: Activation,
}

/// The gradient of an objective with respect to a single layer's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGrad {
    pub weights: Array2<f32>,
    pub bias: Array1<f32>,
}

impl LayerGrad {
    /// Returns an all zero gradient shaped like `layer`'s parameters.
    pub fn zeros_like(layer: &Layer) -> Self {
        Self {
            weights: Array2::zeros(layer.weights.raw_dim()),
            bias: Array1::zeros(layer.node_count),
        }
    }
}

impl Layer {
    /// Creates a new `Layer` with He initialized weights and zero bias.
    ///
    /// Weights are drawn from a normal distribution with mean 0 and standard deviation
    /// `sqrt(2 / fan_in)`.
    ///
    /// # Arguments
    /// * `fan_in` - The amount of inputs.
    /// * `node_count` - The amount of outputs.
    /// * `activation` - The activation applied to the affine output.
    /// * `rng` - The random source used for the weights.
    ///
    /// # Returns
    /// The new layer or `MlErr::InvalidArgument` if any of the sizes is zero.
    pub fn new<R>(
        fan_in: usize,
        node_count: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        if fan_in == 0 {
            return Err(MlErr::InvalidArgument("layer fan in must be positive"));
        }
        if node_count == 0 {
            return Err(MlErr::InvalidArgument("layer node count must be positive"));
        }

        let std_dev = (2. / fan_in as f32).sqrt();
        let distribution = Normal::new(0., std_dev)?;
        let weights = Array2::random_using((node_count, fan_in), distribution, rng);
        trace!(fan_in = fan_in, node_count = node_count; "initialized dense layer");

        Ok(Self {
            fan_in,
            node_count,
            weights,
            bias: Array1::zeros(node_count),
            activation,
        })
    }

    /// Creates a `Layer` from explicit parameters.
    ///
    /// # Returns
    /// The new layer, `MlErr::InvalidArgument` if `weights` is empty or
    /// `MlErr::DimensionMismatch` if `bias` does not have one entry per row of `weights`.
    pub fn from_parts(
        weights: Array2<f32>,
        bias: Array1<f32>,
        activation: Activation,
    ) -> Result<Self> {
        let (node_count, fan_in) = weights.dim();
        if node_count == 0 || fan_in == 0 {
            return Err(MlErr::InvalidArgument("layer weights must not be empty"));
        }
        MlErr::check_len("bias", bias.len(), node_count)?;

        Ok(Self {
            fan_in,
            node_count,
            weights,
            bias,
            activation,
        })
    }

    pub fn fan_in(&self) -> usize {
        self.fan_in
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    /// Mutable access to the weights. The shape must not be changed.
    pub fn weights_mut(&mut self) -> &mut Array2<f32> {
        &mut self.weights
    }

    pub fn bias(&self) -> &Array1<f32> {
        &self.bias
    }

    /// Mutable access to the bias. The length must not be changed.
    pub fn bias_mut(&mut self) -> &mut Array1<f32> {
        &mut self.bias
    }

    /// Returns the amount of scalar parameters of this layer.
    pub fn num_params(&self) -> usize {
        (self.fan_in + 1) * self.node_count
    }

    /// Computes `weights · input + bias`, without the activation.
    ///
    /// # Returns
    /// The pre-activation output or `MlErr::DimensionMismatch` if `input.len() != fan_in`.
    pub fn affine(&self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        MlErr::check_len("layer input", input.len(), self.fan_in)?;
        Ok(self.weights.dot(&input) + &self.bias)
    }

    /// Applies the layer to `input`: the affine transform followed by the activation.
    ///
    /// # Returns
    /// The layer's output or `MlErr::DimensionMismatch` if `input.len() != fan_in`.
    pub fn apply(&self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        let z = self.affine(input)?;
        Ok(self.activation.apply_into(z))
    }

    /// Propagates an upstream `delta` back through this layer.
    ///
    /// The first `fan_in` entries of the result are `weightsᵗ · delta` and the last one is the
    /// inner product `bias · delta`.
    ///
    /// # Returns
    /// A vector of length `fan_in + 1` or `MlErr::DimensionMismatch` if
    /// `delta.len() != node_count`.
    pub fn transpose_weighted(&self, delta: ArrayView1<f32>) -> Result<Array1<f32>> {
        MlErr::check_len("delta", delta.len(), self.node_count)?;

        let mut out = Array1::zeros(self.fan_in + 1);
        out.slice_mut(s![..self.fan_in])
            .assign(&self.weights.t().dot(&delta));
        out[self.fan_in] = self.bias.dot(&delta);

        Ok(out)
    }
}
