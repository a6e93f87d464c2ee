//! Mean Squared Error Loss

use super::{Loss, LossFn};
use crate::error::{Error, Result};
use crate::Tensor;

/// Mean Squared Error Loss
///
/// L = mean((predictions - targets)^2)
///
/// # Example
///
/// ```
/// use aprendiz::train::{LossFn, MSELoss};
/// use ndarray::array;
///
/// let loss = MSELoss
///     .forward(&array![[1.0], [2.0]], &[array![[1.5], [2.5]]])
///     .unwrap();
/// assert!((loss.value - 0.25).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MSELoss;

impl LossFn for MSELoss {
    fn forward(&self, predictions: &Tensor, targets: &[Tensor]) -> Result<Loss> {
        let target = targets.first().ok_or(Error::MissingState("loss target"))?;
        if predictions.dim() != target.dim() {
            return Err(Error::ShapeMismatch {
                context: "mse loss",
                expected: target.dim(),
                actual: predictions.dim(),
            });
        }

        let diff = predictions - target;
        let n = diff.len().max(1) as f32;
        let value = diff.iter().map(|d| d * d).sum::<f32>() / n;

        // d(MSE)/d(pred) = 2 * (pred - target) / n
        let grad = diff * (2.0 / n);
        Ok(Loss { value, grad })
    }

    fn name(&self) -> &'static str {
        "MSE"
    }
}
