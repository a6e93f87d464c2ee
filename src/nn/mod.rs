//! Model collaborator
//!
//! The training loop treats the model as an opaque numeric object. It only needs:
//! - a train/eval mode flag
//! - a forward pass and a backward pass driven by the loss gradient
//! - mutable access to its parameters for the optimizer
//!
//! [`Linear`] is a small reference model so the loop can be exercised end to end.

mod device;
mod linear;
mod model;

pub use device::Device;
pub use linear::Linear;
pub use model::{Model, Parameter};
