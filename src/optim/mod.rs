//! Optimizers and learning rate schedulers

mod optimizer;
mod scheduler;
mod sgd;

pub use optimizer::{Optimizer, OptimizerFactory};
pub use scheduler::{ExponentialLR, LRScheduler};
pub use sgd::SGD;
