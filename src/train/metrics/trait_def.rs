//! Core Metric trait definition

use crate::error::Result;
use crate::Tensor;

/// Trait for evaluation metrics computed on one batch
pub trait Metric {
    /// Compute the metric given predictions and targets
    fn compute(&self, predictions: &Tensor, targets: &Tensor) -> Result<f32>;

    /// Name of the metric
    fn name(&self) -> &str;

    /// Whether higher values are better (true) or lower (false)
    fn higher_is_better(&self) -> bool {
        true
    }
}

/// Fail unless predictions and targets have the same number of rows
pub(super) fn check_rows(
    context: &'static str,
    predictions: &Tensor,
    targets: &Tensor,
) -> Result<()> {
    if predictions.nrows() != targets.nrows() {
        return Err(crate::error::Error::ShapeMismatch {
            context,
            expected: (targets.nrows(), predictions.ncols()),
            actual: predictions.dim(),
        });
    }
    Ok(())
}
