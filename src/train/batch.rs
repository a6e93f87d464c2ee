//! Batch data structure

use crate::nn::Device;
use crate::Tensor;

/// A training batch
///
/// The first `num_inputs` tensors are model inputs, the remaining ones are
/// loss targets. All tensors share the same number of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Input tensors followed by target tensors
    pub tensors: Vec<Tensor>,
    /// Device the tensors live on
    pub device: Device,
}

impl Batch {
    /// Create a new host batch
    pub fn new(tensors: Vec<Tensor>) -> Self {
        Self {
            tensors,
            device: Device::Cpu,
        }
    }

    /// Create a batch from a single input and a single target
    pub fn pair(inputs: Tensor, targets: Tensor) -> Self {
        Self::new(vec![inputs, targets])
    }

    /// Get batch size (rows of the first tensor)
    pub fn len(&self) -> usize {
        self.tensors.first().map_or(0, |t| t.nrows())
    }

    /// Check if the batch has no samples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Model inputs
    pub fn inputs(&self, num_inputs: usize) -> &[Tensor] {
        &self.tensors[..num_inputs.min(self.tensors.len())]
    }

    /// Loss targets
    pub fn targets(&self, num_inputs: usize) -> &[Tensor] {
        &self.tensors[num_inputs.min(self.tensors.len())..]
    }

    /// Move the batch to a device
    pub fn to_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }
}
