use super::Optimizer;
use crate::arch::layers::{Layer, LayerGrad};

/// Gradient descent optimization algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientDescent {
    learning_rate: f32,
}

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken on `update`.
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

impl Default for GradientDescent {
    /// Unit learning rate, the raw gradient is subtracted.
    fn default() -> Self {
        Self::new(1.)
    }
}

impl Optimizer for GradientDescent {
    /// Updates the parameters according to the algorithm's learning rule, that is, making a step in
    /// the opposite direction of the gradient, with a length of `learning_rate`.
    ///
    /// # Arguments
    /// * `layer` - The layer whose parameters are going to be modified.
    /// * `grad` - The gradient used for taking the step.
    fn update(&mut self, layer: &mut Layer, grad: &LayerGrad) {
        let lr = self.learning_rate;

        layer.weights_mut().scaled_add(-lr, &grad.weights);
        layer.bias_mut().scaled_add(-lr, &grad.bias);
    }
}
