//! A small feedforward neural network library: dense layers, a sequential `Model`, two loss
//! functions and per-instance stochastic gradient descent.

pub mod arch;
pub mod dataset;
pub mod error;
pub mod optimization;
pub mod training;

pub use arch::{
    Model,
    activations::Activation,
    layers::{Layer, LayerGrad},
    loss::Loss,
};
pub use dataset::{Dataset, Instance};
pub use error::{MlErr, Result};
pub use optimization::{GradientDescent, Optimizer};
pub use training::{Config, LayerConfig, ModelConfig, Trainer, TrainingConfig};
