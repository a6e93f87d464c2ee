//! Regression metrics

use super::trait_def::check_rows;
use super::Metric;
use crate::error::{Error, Result};
use crate::Tensor;

/// Mean Absolute Error (MAE) metric
///
/// MAE = mean(|y - y_pred|)
#[derive(Debug, Clone, Copy, Default)]
pub struct MAE;

impl Metric for MAE {
    fn compute(&self, predictions: &Tensor, targets: &Tensor) -> Result<f32> {
        check_rows("mae", predictions, targets)?;
        if predictions.dim() != targets.dim() {
            return Err(Error::ShapeMismatch {
                context: "mae",
                expected: targets.dim(),
                actual: predictions.dim(),
            });
        }
        if predictions.is_empty() {
            return Ok(0.0);
        }

        let total: f32 = predictions
            .iter()
            .zip(targets.iter())
            .map(|(p, t)| (p - t).abs())
            .sum();
        Ok(total / predictions.len() as f32)
    }

    fn name(&self) -> &'static str {
        "MAE"
    }

    fn higher_is_better(&self) -> bool {
        false
    }
}
