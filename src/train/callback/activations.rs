//! Output activation statistics

use super::{Callback, Hook, HookResult, HookSet};
use crate::train::tui::sparkline;
use crate::train::LearnerState;
use std::cell::RefCell;
use std::rc::Rc;

/// Per-batch statistics of the model output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivationStats {
    /// Mean of every recorded batch
    pub means: Vec<f32>,
    /// Sample standard deviation of every recorded batch
    pub stds: Vec<f32>,
    /// Histogram of absolute values of every recorded batch
    pub histograms: Vec<Vec<u32>>,
}

impl ActivationStats {
    /// Number of recorded batches
    pub fn len(&self) -> usize {
        self.means.len()
    }

    /// Check if no batch was recorded
    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    /// Share of each batch's values that fell in the lowest histogram bin
    ///
    /// A share near 1 means the output is stuck near zero.
    pub fn near_zero_fraction(&self) -> Vec<f32> {
        self.histograms
            .iter()
            .map(|h| {
                let total: u32 = h.iter().sum();
                match (h.first(), total) {
                    (Some(&low), total) if total > 0 => low as f32 / total as f32,
                    _ => 0.0,
                }
            })
            .collect()
    }

    /// Sparklines of the means and standard deviations
    pub fn render(&self, width: usize) -> String {
        format!(
            "mean {} │ std {}",
            sparkline(&self.means, width),
            sparkline(&self.stds, width)
        )
    }
}

/// Records the mean, standard deviation and histogram of the predictions
/// of every batch in `after_predict`
///
/// By default only training batches are recorded. The histogram counts
/// absolute values in `bins` equal-width bins over `[0, max]`; values
/// outside the range are not counted.
pub struct ActivationStatisticsCallback {
    on_train: bool,
    on_valid: bool,
    bins: usize,
    max: f32,
    stats: Rc<RefCell<ActivationStats>>,
}

impl ActivationStatisticsCallback {
    /// Record training batches, 40 bins over `[0, 10]`
    pub fn new() -> Self {
        Self {
            on_train: true,
            on_valid: false,
            bins: 40,
            max: 10.0,
            stats: Rc::new(RefCell::new(ActivationStats::default())),
        }
    }

    /// Record training batches
    pub fn on_train(mut self, on_train: bool) -> Self {
        self.on_train = on_train;
        self
    }

    /// Record validation batches
    pub fn on_valid(mut self, on_valid: bool) -> Self {
        self.on_valid = on_valid;
        self
    }

    /// Histogram layout
    pub fn with_histogram(mut self, bins: usize, max: f32) -> Self {
        self.bins = bins.max(1);
        self.max = max;
        self
    }

    /// Handle to the recorded statistics
    pub fn stats(&self) -> Rc<RefCell<ActivationStats>> {
        Rc::clone(&self.stats)
    }

    fn histogram(&self, values: impl Iterator<Item = f32>) -> Vec<u32> {
        let mut counts = vec![0u32; self.bins];
        let width = self.max / self.bins as f32;
        for v in values.map(f32::abs) {
            if !(0.0..=self.max).contains(&v) {
                continue;
            }
            let bin = ((v / width) as usize).min(self.bins - 1);
            counts[bin] += 1;
        }
        counts
    }
}

impl Default for ActivationStatisticsCallback {
    fn default() -> Self {
        Self::new()
    }
}

impl Callback for ActivationStatisticsCallback {
    fn name(&self) -> &'static str {
        "ActivationStatisticsCallback"
    }

    fn hooks(&self) -> HookSet {
        HookSet::of(&[Hook::BeforeFit, Hook::AfterPredict])
    }

    fn before_fit(&mut self, _state: &mut LearnerState) -> HookResult {
        *self.stats.borrow_mut() = ActivationStats::default();
        Ok(())
    }

    fn after_predict(&mut self, state: &mut LearnerState) -> HookResult {
        let training = state.training();
        if !((self.on_train && training) || (self.on_valid && !training)) {
            return Ok(());
        }
        let predictions = state.predictions()?;
        let n = predictions.len();
        if n == 0 {
            return Ok(());
        }

        let mean = predictions.sum() / n as f32;
        let std = if n > 1 {
            let sq_dev: f32 = predictions.iter().map(|v| (v - mean).powi(2)).sum();
            (sq_dev / (n - 1) as f32).sqrt()
        } else {
            0.0
        };
        let histogram = self.histogram(predictions.iter().copied());

        let mut stats = self.stats.borrow_mut();
        stats.means.push(mean);
        stats.stds.push(std);
        stats.histograms.push(histogram);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::learner::fixtures::toy_state;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_records_mean_std_histogram() {
        let mut cb = ActivationStatisticsCallback::new().with_histogram(4, 4.0);
        let mut state = toy_state();
        state.predictions = Some(array![[-1.0], [1.0], [3.0], [9.0]]);

        cb.after_predict(&mut state).unwrap();

        let stats = cb.stats();
        let stats = stats.borrow();
        assert_eq!(stats.len(), 1);
        assert_abs_diff_eq!(stats.means[0], 3.0);
        // sample variance: (16 + 4 + 0 + 36) / 3
        assert_abs_diff_eq!(stats.stds[0], (56.0f32 / 3.0).sqrt(), epsilon = 1e-5);
        assert_eq!(stats.histograms[0], vec![0, 2, 0, 1]);
    }

    #[test]
    fn test_respects_pass_kind() {
        let mut cb = ActivationStatisticsCallback::new();
        let mut state = toy_state();
        state.predictions = Some(array![[0.5]]);

        state.model.set_training(false);
        cb.after_predict(&mut state).unwrap();
        assert!(cb.stats().borrow().is_empty());

        let mut cb = cb.on_train(false).on_valid(true);
        cb.after_predict(&mut state).unwrap();
        state.model.set_training(true);
        cb.after_predict(&mut state).unwrap();
        assert_eq!(cb.stats().borrow().len(), 1);
        assert_eq!(cb.stats().borrow().stds, vec![0.0]);
    }

    #[test]
    fn test_near_zero_fraction() {
        let stats = ActivationStats {
            means: vec![0.0, 0.0],
            stds: vec![0.0, 0.0],
            histograms: vec![vec![3, 1], vec![0, 0]],
        };
        assert_eq!(stats.near_zero_fraction(), vec![0.75, 0.0]);
        assert!(stats.render(4).starts_with("mean "));
    }

    #[test]
    fn test_before_fit_resets() {
        let mut cb = ActivationStatisticsCallback::new();
        let mut state = toy_state();
        state.predictions = Some(array![[0.5]]);
        cb.after_predict(&mut state).unwrap();
        cb.before_fit(&mut state).unwrap();
        assert!(cb.stats().borrow().is_empty());
    }
}
