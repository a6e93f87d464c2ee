//! Stochastic Gradient Descent optimizer

use super::Optimizer;
use crate::nn::Parameter;
use crate::Tensor;

/// SGD optimizer with optional momentum
///
/// # Example
///
/// ```
/// use aprendiz::nn::Parameter;
/// use aprendiz::optim::{Optimizer, SGD};
/// use ndarray::array;
///
/// let mut param = Parameter::new(array![[1.0]]);
/// param.grad.fill(2.0);
///
/// let mut sgd = SGD::new(0.1, 0.0);
/// sgd.step(&mut [&mut param]);
/// assert!((param.value[[0, 0]] - 0.8).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct SGD {
    lr: f32,
    momentum: f32,
    velocities: Vec<Option<Tensor>>,
}

impl SGD {
    /// Create a new SGD optimizer
    pub fn new(lr: f32, momentum: f32) -> Self {
        Self {
            lr,
            momentum,
            velocities: Vec::new(),
        }
    }

    /// Initialize velocities if needed
    fn ensure_velocities(&mut self, count: usize) {
        if self.velocities.len() != count {
            self.velocities = vec![None; count];
        }
    }
}

impl Optimizer for SGD {
    fn step(&mut self, params: &mut [&mut Parameter]) {
        self.ensure_velocities(params.len());

        for (i, param) in params.iter_mut().enumerate() {
            if self.momentum > 0.0 {
                // v = momentum * v - lr * grad
                let velocity = match &self.velocities[i] {
                    Some(v) => v * self.momentum - &param.grad * self.lr,
                    None => &param.grad * (-self.lr),
                };
                param.value += &velocity;
                self.velocities[i] = Some(velocity);
            } else {
                // param -= lr * grad
                let update = &param.grad * self.lr;
                param.value -= &update;
            }
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }
}
