//! Loss function trait

use crate::error::Result;
use crate::nn::Model;
use crate::Tensor;

/// Scalar loss together with its gradient w.r.t. the predictions
#[derive(Debug, Clone, PartialEq)]
pub struct Loss {
    /// Scalar loss value
    pub value: f32,
    /// d(loss)/d(predictions)
    pub grad: Tensor,
}

impl Loss {
    /// Backpropagate this loss through the model that produced the predictions
    pub fn backward(&self, model: &mut dyn Model) -> Result<()> {
        model.backward(&self.grad)
    }

    /// Loss with value and gradient multiplied by `factor`
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            value: self.value * factor,
            grad: &self.grad * factor,
        }
    }
}

/// Trait for loss functions
pub trait LossFn {
    /// Compute loss given predictions and the target tensors of a batch
    fn forward(&self, predictions: &Tensor, targets: &[Tensor]) -> Result<Loss>;

    /// Name of the loss function
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_loss_scaled() {
        let loss = Loss {
            value: 0.5,
            grad: array![[1.0, -2.0]],
        };
        let scaled = loss.scaled(4.0);
        assert_eq!(scaled.value, 2.0);
        assert_eq!(scaled.grad, array![[4.0, -8.0]]);
    }
}
