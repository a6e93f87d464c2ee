//! Optimizer trait

use crate::nn::Parameter;

/// Trait for optimization algorithms
///
/// Parameters are borrowed from the model for each call, so one optimizer
/// instance can be rebuilt per `fit` without holding on to the model.
pub trait Optimizer {
    /// Perform a single optimization step
    fn step(&mut self, params: &mut [&mut Parameter]);

    /// Zero out all gradients
    fn zero_grad(&mut self, params: &mut [&mut Parameter]) {
        for param in params.iter_mut() {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);
}

/// Builds a fresh optimizer for a given learning rate
pub type OptimizerFactory = Box<dyn Fn(f32) -> Box<dyn Optimizer>>;
