mod dense;

pub use dense::{Layer, LayerGrad};
