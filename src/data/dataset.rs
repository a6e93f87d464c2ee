//! In-memory dataset of aligned input/target rows

use crate::error::{Error, Result};
use crate::Tensor;
use ndarray::Axis;

/// Dataset holding one input row and one target row per sample
#[derive(Debug, Clone)]
pub struct Dataset {
    inputs: Tensor,
    targets: Tensor,
}

impl Dataset {
    /// Create a dataset; inputs and targets must have the same number of rows
    pub fn new(inputs: Tensor, targets: Tensor) -> Result<Self> {
        if inputs.nrows() != targets.nrows() {
            return Err(Error::ShapeMismatch {
                context: "dataset rows",
                expected: (inputs.nrows(), targets.ncols()),
                actual: targets.dim(),
            });
        }
        Ok(Self { inputs, targets })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.inputs.nrows()
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gather the given sample indices into (inputs, targets)
    pub fn select(&self, indices: &[usize]) -> (Tensor, Tensor) {
        (
            self.inputs.select(Axis(0), indices),
            self.targets.select(Axis(0), indices),
        )
    }
}
