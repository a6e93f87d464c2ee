//! Classification metrics

use super::trait_def::check_rows;
use super::Metric;
use crate::error::Result;
use crate::Tensor;
use ndarray::ArrayView1;

/// Index of the largest value in a row
fn argmax(row: ArrayView1<'_, f32>) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best, best_v), (i, &v)| {
            if v > best_v {
                (i, v)
            } else {
                (best, best_v)
            }
        })
        .0
}

/// Accuracy metric for classification
///
/// - Multi-column predictions: argmax of the row is the predicted class. Targets
///   are either class indices (one column) or one-hot rows.
/// - Single-column predictions: binary, thresholded at `threshold`.
///
/// # Example
///
/// ```
/// use aprendiz::train::{Accuracy, Metric};
/// use ndarray::array;
///
/// let pred = array![[0.1, 0.9], [0.8, 0.2], [0.3, 0.7]];
/// let target = array![[1.0], [0.0], [0.0]];
/// let acc = Accuracy::default().compute(&pred, &target).unwrap();
/// assert!((acc - 2.0 / 3.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct Accuracy {
    /// Threshold for binary classification
    pub(crate) threshold: f32,
}

impl Accuracy {
    /// Create new accuracy metric with given threshold for binary classification
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Default for Accuracy {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Metric for Accuracy {
    fn compute(&self, predictions: &Tensor, targets: &Tensor) -> Result<f32> {
        check_rows("accuracy", predictions, targets)?;
        if predictions.nrows() == 0 {
            return Ok(0.0);
        }

        let correct = predictions
            .rows()
            .into_iter()
            .zip(targets.rows())
            .filter(|(pred, target)| {
                if pred.len() == 1 {
                    (pred[0] >= self.threshold) == (target[0] >= 0.5)
                } else if target.len() == 1 {
                    argmax(*pred) == target[0].round() as usize
                } else {
                    argmax(*pred) == argmax(*target)
                }
            })
            .count();

        Ok(correct as f32 / predictions.nrows() as f32)
    }

    fn name(&self) -> &'static str {
        "Accuracy"
    }
}
