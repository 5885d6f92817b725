use log::debug;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::Trainer;
use crate::{
    MlErr, Result,
    arch::{Model, activations::Activation, loss::Loss},
    optimization::GradientDescent,
};

/// A single dense layer of a `ModelConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LayerConfig {
    pub nodes: usize,
    #[serde(default)]
    pub activation: Activation,
}

/// The architecture of a `Model`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelConfig {
    pub input_size: usize,
    pub layers: Vec<LayerConfig>,
    #[serde(default)]
    pub loss: Option<Loss>,
}

impl ModelConfig {
    /// Builds the configured model, drawing every layer's weights from `rng`.
    ///
    /// # Returns
    /// Fails like `Model::new`, `Model::add_layer` and `Model::set_loss`.
    pub fn build<R>(&self, rng: &mut R) -> Result<Model>
    where
        R: Rng + ?Sized,
    {
        let mut model = Model::new(self.input_size)?;
        for layer in &self.layers {
            model.add_layer(layer.nodes, layer.activation, rng)?;
        }

        if let Some(loss) = self.loss {
            model.set_loss(loss)?;
        }

        debug!(layers = model.len(), params = model.num_params(); "built model");
        Ok(model)
    }
}

fn default_learning_rate() -> f32 {
    1.
}

/// How to train a `Model`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TrainingConfig {
    pub epochs: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
    /// Seed for every random draw of a run; runs are reproducible only when set.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            learning_rate: default_learning_rate(),
            seed: None,
        }
    }
}

impl TrainingConfig {
    /// Returns a generator seeded from `seed`, or from the OS when there is none.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    pub fn trainer(&self) -> Trainer<GradientDescent> {
        Trainer::new(GradientDescent::new(self.learning_rate), self.epochs)
    }
}

/// A full run of the demo binary: the model, how to train it and the synthetic data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    pub model: ModelConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    /// Amount of noisy quadratic samples to fit.
    pub samples: usize,
    /// Standard deviation of the samples' noise.
    #[serde(default)]
    pub noise: f32,
}

impl Config {
    /// Decodes a `Config` from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Checks the values serde cannot, before anything is built.
    pub fn validate(&self) -> Result<()> {
        if self.samples == 0 {
            return Err(MlErr::Config("samples must be positive".into()));
        }

        let lr = self.training.learning_rate;
        if !lr.is_finite() || lr <= 0. {
            return Err(MlErr::Config(format!(
                "learning rate must be positive, got {lr}"
            )));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig {
                input_size: 1,
                layers: vec![
                    LayerConfig {
                        nodes: 10,
                        activation: Activation::Relu,
                    },
                    LayerConfig {
                        nodes: 1,
                        activation: Activation::None,
                    },
                ],
                loss: Some(Loss::LeastSquares),
            },
            training: TrainingConfig {
                epochs: 10,
                learning_rate: 0.01,
                seed: Some(42),
            },
            samples: 100,
            noise: 0.05,
        }
    }
}
