//! Exponential learning rate scheduler

use super::LRScheduler;
use crate::optim::Optimizer;

/// Exponential Learning Rate Scheduler
///
/// Multiplies the learning rate by gamma on every step.
///
/// Formula: lr_t = lr_initial * gamma^t
///
/// With gamma > 1 this is the geometric sweep used by the learning rate finder.
#[derive(Debug, Clone)]
pub struct ExponentialLR {
    lr_initial: f32,
    gamma: f32,
    current_step: usize,
}

impl ExponentialLR {
    /// Create a new exponential scheduler
    ///
    /// # Arguments
    /// * `lr_initial` - Learning rate at step 0
    /// * `gamma` - Multiplicative factor applied per step
    pub fn new(lr_initial: f32, gamma: f32) -> Self {
        Self {
            lr_initial,
            gamma,
            current_step: 0,
        }
    }

    /// Apply the current learning rate to an optimizer
    pub fn apply(&self, optimizer: &mut dyn Optimizer) {
        optimizer.set_lr(self.get_lr());
    }
}

impl LRScheduler for ExponentialLR {
    fn get_lr(&self) -> f32 {
        self.lr_initial * self.gamma.powi(self.current_step as i32)
    }

    fn step(&mut self) {
        self.current_step += 1;
    }
}
