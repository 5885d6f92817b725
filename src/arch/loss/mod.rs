mod loss_fn;

pub use loss_fn::Loss;
