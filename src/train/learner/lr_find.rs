//! Learning-rate range test on a learner

use super::Learner;
use crate::error::Result;
use crate::train::callback::{LrFinderCallback, LrSweep};
use crate::train::FitOptions;
use serde::{Deserialize, Serialize};

/// Parameters of [`Learner::find_lr`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LrFindOptions {
    /// Learning rate of the first batch
    pub start_lr: f32,
    /// Factor applied to the learning rate after every batch
    pub lr_multiplier: f32,
    /// Stop once the loss exceeds the lowest loss times this factor
    pub max_multiplier: f32,
    /// Upper bound on epochs swept
    pub max_epochs: usize,
}

impl Default for LrFindOptions {
    fn default() -> Self {
        Self {
            start_lr: 1e-5,
            lr_multiplier: 1.3,
            max_multiplier: 3.0,
            max_epochs: 10,
        }
    }
}

impl Learner {
    /// Sweep the learning rate upward until the loss diverges
    ///
    /// The model is trained during the sweep; rebuild or reload it before
    /// the real run.
    pub fn find_lr(&mut self, options: LrFindOptions) -> Result<LrSweep> {
        let finder = LrFinderCallback::new(options.lr_multiplier, options.max_multiplier);
        let sweep = finder.sweep();
        let fit = FitOptions::new(options.max_epochs).with_learning_rate(options.start_lr);
        self.fit_with(fit, vec![Box::new(finder)])?;
        let result = sweep.borrow().clone();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::learner::fixtures::toy_learner;
    use crate::train::learner::steps::TrainSteps;

    #[test]
    fn test_find_lr_stops_on_divergence() {
        let mut learner = toy_learner().with_steps(TrainSteps);
        let options = LrFindOptions {
            start_lr: 0.01,
            lr_multiplier: 2.0,
            ..LrFindOptions::default()
        };

        let sweep = learner.find_lr(options).unwrap();

        assert!(!sweep.is_empty());
        assert!(sweep.len() < 40, "sweep never diverged");
        assert_eq!(sweep.learning_rates[0], 0.01);
        assert!(learner.callbacks().is_empty());
        let last = *sweep.losses.last().unwrap();
        let min = sweep.losses.iter().copied().fold(f32::INFINITY, f32::min);
        assert!(!last.is_finite() || last > min * 3.0);
    }
}
