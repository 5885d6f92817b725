use log::debug;
use ndarray::{Array1, Array2, ArrayView1, Axis, s};
use rand::Rng;
use rayon::prelude::*;

use super::{
    activations::Activation,
    layers::{Layer, LayerGrad},
    loss::Loss,
};
use crate::{MlErr, Result, dataset::Instance, optimization::GradientDescent, training::Trainer};

/// A feedforward network: an ordered stack of dense layers. Information flows forward when
/// computing an output and backward when computing the *deltas* of its layers.
///
/// The first layer's fan in is `input_size` and every following layer's fan in is the node
/// count of the one before it. A model without layers maps any input to itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    input_size: usize,
    layers: Vec<Layer>,
    loss: Option<Loss>,
}

impl Model {
    /// Creates a new `Model` without layers nor loss.
    ///
    /// # Arguments
    /// * `input_size` - The expected length of every input.
    ///
    /// # Returns
    /// The new model or `MlErr::InvalidArgument` if `input_size` is zero.
    pub fn new(input_size: usize) -> Result<Self> {
        if input_size == 0 {
            return Err(MlErr::InvalidArgument("model input size must be positive"));
        }

        Ok(Self {
            input_size,
            layers: Vec::new(),
            loss: None,
        })
    }

    /// Appends a new He initialized layer connected to the current output.
    ///
    /// # Arguments
    /// * `node_count` - The amount of outputs of the new layer.
    /// * `activation` - The new layer's activation.
    /// * `rng` - The random source for the layer's weights.
    ///
    /// # Returns
    /// `MlErr::InvalidArgument` if `node_count` is zero or if `activation` is not a valid
    /// output activation for the configured loss.
    pub fn add_layer<R>(
        &mut self,
        node_count: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Result<()>
    where
        R: Rng + ?Sized,
    {
        let layer = Layer::new(self.output_size(), node_count, activation, rng)?;
        self.push_layer(layer)
    }

    /// Appends an already built layer.
    ///
    /// # Returns
    /// `MlErr::DimensionMismatch` if the layer's fan in is not the current output size, or
    /// `MlErr::InvalidArgument` if its activation does not pair with the configured loss.
    pub fn push_layer(&mut self, layer: Layer) -> Result<()> {
        MlErr::check_len("layer fan in", layer.fan_in(), self.output_size())?;
        if let Some(loss) = self.loss {
            loss.check_output(layer.activation())?;
        }

        debug!(
            index = self.layers.len(),
            fan_in = layer.fan_in(),
            node_count = layer.node_count();
            "appended layer"
        );
        self.layers.push(layer);
        Ok(())
    }

    /// Sets the loss used by `score`, `gradient` and training.
    ///
    /// # Returns
    /// `MlErr::InvalidArgument` if the current output layer does not pair with `loss`, in
    /// which case the previous loss is kept.
    pub fn set_loss(&mut self, loss: Loss) -> Result<()> {
        let output_activation = self
            .layers
            .last()
            .map_or(Activation::None, Layer::activation);
        loss.check_output(output_activation)?;

        self.loss = Some(loss);
        Ok(())
    }

    pub fn loss(&self) -> Option<Loss> {
        self.loss
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Returns the length of the model's output, `input_size` when there are no layers.
    pub fn output_size(&self) -> usize {
        self.layers
            .last()
            .map_or(self.input_size, Layer::node_count)
    }

    /// Returns the amount of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Mutable access to the layers' parameters, layers cannot be added nor removed through it.
    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    /// Returns the amount of scalar parameters in the model.
    pub fn num_params(&self) -> usize {
        self.layers.iter().map(Layer::num_params).sum()
    }

    /// Makes a forward pass through the network.
    ///
    /// # Returns
    /// The prediction for `input` or `MlErr::DimensionMismatch` if its length is not
    /// `input_size`.
    pub fn evaluate(&self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        MlErr::check_len("input", input.len(), self.input_size)?;

        self.layers
            .iter()
            .try_fold(input.to_owned(), |x, layer| layer.apply(x.view()))
    }

    /// Evaluates `input` and scores the result against `targets` with the configured loss.
    ///
    /// # Returns
    /// `MlErr::InvalidArgument` if no loss is set or `MlErr::DimensionMismatch` if `input` or
    /// `targets` do not have the expected lengths.
    pub fn score(&self, input: ArrayView1<f32>, targets: ArrayView1<f32>) -> Result<f32> {
        let loss = self.check_instance(input, targets)?;
        let result = self.evaluate(input)?;
        Ok(loss.score(result.view(), targets))
    }

    /// Like `score`, but returns the value training minimizes (see `Loss::objective`).
    pub fn objective(&self, input: ArrayView1<f32>, targets: ArrayView1<f32>) -> Result<f32> {
        let loss = self.check_instance(input, targets)?;
        let result = self.evaluate(input)?;
        Ok(loss.objective(result.view(), targets))
    }

    /// Computes the mean objective over `instances`, evaluating them in parallel.
    ///
    /// The objectives are summed in instance order, so the result does not depend on how the
    /// work was split between threads.
    ///
    /// # Returns
    /// `MlErr::InvalidArgument` if `instances` is empty, plus the errors of `objective`.
    pub fn mean_objective(&self, instances: &[Instance]) -> Result<f32> {
        if instances.is_empty() {
            return Err(MlErr::InvalidArgument("no instances to average over"));
        }

        let objectives = instances
            .par_iter()
            .map(|(x, y)| self.objective(x.view(), y.view()))
            .collect::<Result<Vec<f32>>>()?;

        Ok(objectives.iter().sum::<f32>() / instances.len() as f32)
    }

    /// Computes the gradient of the objective with respect to every layer's parameters for a
    /// single input/target pair.
    ///
    /// # Returns
    /// One `LayerGrad` per layer, in layer order, shaped like the layer's parameters. Fails
    /// like `score`.
    pub fn gradient(
        &self,
        input: ArrayView1<f32>,
        targets: ArrayView1<f32>,
    ) -> Result<Vec<LayerGrad>> {
        let loss = self.check_instance(input, targets)?;
        let (grads, _) = self.backprop(loss, input, targets)?;
        Ok(grads)
    }

    /// Fits the model with classic unit-rate backpropagation.
    ///
    /// Each epoch draws `instances.len()` instances uniformly with replacement and updates
    /// every layer right after computing each instance's gradient. The step is seeded with the
    /// residual `r - t` instead of the full objective derivative (see `Loss::residual_scale`),
    /// so `LeastSquares` models move by half their `gradient`. Stepping by the full gradient
    /// at unit rate overshoots on small ReLU networks.
    ///
    /// # Returns
    /// Fails like `gradient` for any instance, before any parameter is modified.
    pub fn train<R>(&mut self, instances: &[Instance], epochs: usize, rng: &mut R) -> Result<()>
    where
        R: Rng + ?Sized,
    {
        let rate = self.configured_loss()?.residual_scale();
        Trainer::new(GradientDescent::new(rate), epochs).train(self, instances, rng)?;
        Ok(())
    }

    /// Validates every instance up front and returns the configured loss.
    pub(crate) fn check_instances(&self, instances: &[Instance]) -> Result<Loss> {
        let loss = self.configured_loss()?;
        for (x, y) in instances {
            self.check_instance(x.view(), y.view())?;
        }

        Ok(loss)
    }

    /// Backward pass for a single instance whose lengths were already validated.
    ///
    /// # Returns
    /// The gradients in layer order and the instance's objective before any update.
    pub(crate) fn backprop(
        &self,
        loss: Loss,
        input: ArrayView1<f32>,
        targets: ArrayView1<f32>,
    ) -> Result<(Vec<LayerGrad>, f32)> {
        let n = self.layers.len();
        if n == 0 {
            return Ok((Vec::new(), loss.objective(input, targets)));
        }

        // Forward pass, keeping every layer's output and activation derivative.
        let mut outputs: Vec<Array1<f32>> = Vec::with_capacity(n);
        let mut derivatives: Vec<Array1<f32>> = Vec::with_capacity(n);
        for layer in &self.layers {
            let x = outputs.last().map_or(input, |out| out.view());
            let z = layer.affine(x)?;
            derivatives.push(layer.activation().derivative(z.view()));
            outputs.push(layer.activation().apply_into(z));
        }

        let result = outputs[n - 1].view();
        let objective = loss.objective(result, targets);
        let mut delta = loss.output_delta(result, targets, derivatives[n - 1].view());

        let mut grads = Vec::with_capacity(n);
        for (i, layer) in self.layers.iter().enumerate().rev() {
            let prev = if i == 0 { input } else { outputs[i - 1].view() };
            let weights = outer(delta.view(), prev);

            let next = match i.checked_sub(1) {
                Some(j) => {
                    let back = layer.transpose_weighted(delta.view())?;
                    back.slice_move(s![..layer.fan_in()]) * &derivatives[j]
                }
                None => Array1::zeros(0),
            };

            let bias = std::mem::replace(&mut delta, next);
            grads.push(LayerGrad { weights, bias });
        }
        grads.reverse();

        Ok((grads, objective))
    }

    fn configured_loss(&self) -> Result<Loss> {
        self.loss
            .ok_or(MlErr::InvalidArgument("loss function is not set"))
    }

    fn check_instance(&self, input: ArrayView1<f32>, targets: ArrayView1<f32>) -> Result<Loss> {
        let loss = self.configured_loss()?;
        MlErr::check_len("input", input.len(), self.input_size)?;
        MlErr::check_len("targets", targets.len(), self.output_size())?;
        Ok(loss)
    }
}

/// Returns the outer product `v ⊗ w`, of shape `(v.len(), w.len())`.
fn outer(v: ArrayView1<f32>, w: ArrayView1<f32>) -> Array2<f32> {
    v.insert_axis(Axis(1)).dot(&w.insert_axis(Axis(0)))
}
