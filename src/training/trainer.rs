use log::{debug, info, warn};
use rand::Rng;

use crate::{
    Result,
    arch::Model,
    dataset::{self, Instance},
    optimization::Optimizer,
};

/// A model `Trainer`: runs per-instance stochastic gradient descent with a given optimizer.
pub struct Trainer<O: Optimizer> {
    optimizer: O,
    epochs: usize,
}

impl<O: Optimizer> Trainer<O> {
    /// Returns a new `Trainer`.
    ///
    /// # Arguments
    /// * `optimizer` - Dictates how to update the parameters after each gradient.
    /// * `epochs` - The amount of epochs to run per `train` call.
    pub fn new(optimizer: O, epochs: usize) -> Self {
        Self { optimizer, epochs }
    }

    pub fn epochs(&self) -> usize {
        self.epochs
    }

    pub fn optimizer(&self) -> &O {
        &self.optimizer
    }

    /// Trains `model` over `instances`.
    ///
    /// Every epoch draws `instances.len()` instances uniformly with replacement. For each
    /// draw the gradient is computed and applied right away, so the next draw already sees
    /// the updated parameters.
    ///
    /// # Arguments
    /// * `model` - The model to fit.
    /// * `instances` - The `(input, target)` pairs to sample from.
    /// * `rng` - The random source for sampling.
    ///
    /// # Returns
    /// The mean objective of the sampled instances for each epoch, measured before each
    /// update. Fails without touching the parameters if the model has no loss or any
    /// instance has the wrong dimensions.
    pub fn train<R>(
        &mut self,
        model: &mut Model,
        instances: &[Instance],
        rng: &mut R,
    ) -> Result<Vec<f32>>
    where
        R: Rng + ?Sized,
    {
        let loss = model.check_instances(instances)?;
        if instances.is_empty() {
            warn!("no training instances, skipping {} epochs", self.epochs);
            return Ok(Vec::new());
        }

        let mut losses = Vec::with_capacity(self.epochs);

        for epoch in 0..self.epochs {
            let mut total = 0.;

            for _ in 0..instances.len() {
                let Some((x, y)) = dataset::sample(instances, rng) else {
                    break;
                };

                let (grads, objective) = model.backprop(loss, x.view(), y.view())?;
                for (layer, grad) in model.layers_mut().iter_mut().zip(&grads) {
                    self.optimizer.update(layer, grad);
                }

                total += objective;
            }

            let epoch_loss = total / instances.len() as f32;
            debug!(epoch = epoch, loss = epoch_loss; "finished epoch");
            losses.push(epoch_loss);
        }

        if let Some(last) = losses.last() {
            info!(epochs = self.epochs, loss = *last; "training finished");
        }

        Ok(losses)
    }
}
