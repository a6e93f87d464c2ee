//! Loss functions
//!
//! A loss maps (predictions, targets) to a scalar and carries the gradient of
//! that scalar with respect to the predictions, which `Loss::backward` feeds
//! into the model.

mod mse;
mod traits;

pub use mse::MSELoss;
pub use traits::{Loss, LossFn};
