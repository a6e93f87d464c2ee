//! Learning rate schedulers
//!
//! - `ExponentialLR` - Multiply the learning rate by a constant factor each step

mod exponential;


pub use exponential::ExponentialLR;

/// Learning rate scheduler trait
pub trait LRScheduler {
    /// Get the current learning rate
    fn get_lr(&self) -> f32;

    /// Step the scheduler (typically called after each epoch or batch)
    fn step(&mut self);
}
