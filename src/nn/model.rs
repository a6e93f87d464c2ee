//! Model trait and trainable parameters

use super::Device;
use crate::error::Result;
use crate::Tensor;

/// A trainable parameter with its accumulated gradient
#[derive(Debug, Clone)]
pub struct Parameter {
    /// Current value
    pub value: Tensor,
    /// Accumulated gradient (same shape as `value`)
    pub grad: Tensor,
}

impl Parameter {
    /// Create a parameter with a zeroed gradient
    pub fn new(value: Tensor) -> Self {
        let grad = Tensor::zeros(value.raw_dim());
        Self { value, grad }
    }

    /// Reset the gradient to zero
    pub fn zero_grad(&mut self) {
        self.grad.fill(0.0);
    }

    /// Number of scalar elements
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Check if the parameter has no elements
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// Trait for models driven by the learner
///
/// `backward` receives the gradient of the loss with respect to the last
/// `forward` output and accumulates parameter gradients.
pub trait Model {
    /// Model type name used in summaries
    fn name(&self) -> &'static str {
        "Model"
    }

    /// Compute predictions from the model inputs of a batch
    fn forward(&mut self, inputs: &[Tensor]) -> Result<Tensor>;

    /// Accumulate parameter gradients from the output gradient
    fn backward(&mut self, grad_output: &Tensor) -> Result<()>;

    /// Mutable access to all trainable parameters
    fn parameters_mut(&mut self) -> Vec<&mut Parameter>;

    /// Total number of trainable scalars
    fn num_parameters(&mut self) -> usize {
        self.parameters_mut().iter().map(|p| p.len()).sum()
    }

    /// Switch between training and evaluation mode
    fn set_training(&mut self, training: bool);

    /// Whether the model is in training mode
    fn is_training(&self) -> bool;

    /// Move parameters to a device (no-op for host-only models)
    fn to_device(&mut self, _device: Device) {}

    /// Device holding the parameters
    fn device(&self) -> Device {
        Device::Cpu
    }
}
