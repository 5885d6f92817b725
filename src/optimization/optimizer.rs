use crate::arch::layers::{Layer, LayerGrad};

pub trait Optimizer {
    /// Updates `layer`'s parameters given the gradient of the objective with respect to them.
    fn update(&mut self, layer: &mut Layer, grad: &LayerGrad);
}
