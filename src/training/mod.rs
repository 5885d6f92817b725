mod config;
mod trainer;

pub use config::{Config, LayerConfig, ModelConfig, TrainingConfig};
pub use trainer::Trainer;
