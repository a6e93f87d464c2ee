//! Numeric steps supplied as callback hooks

use super::{Callback, HookResult, HookSet};
use crate::train::learner::steps;
use crate::train::LearnerState;

/// Supplies the five numeric steps of a standard training batch
///
/// Use it with a learner that has no [`NumericSteps`](crate::train::NumericSteps)
/// provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrainCallback;

impl TrainCallback {
    pub fn new() -> Self {
        Self
    }
}

impl Callback for TrainCallback {
    fn name(&self) -> &'static str {
        "TrainCallback"
    }

    fn hooks(&self) -> HookSet {
        HookSet::NUMERIC_STEPS
    }

    fn predict(&mut self, state: &mut LearnerState) -> HookResult {
        steps::predict(state)
    }

    fn calculate_loss(&mut self, state: &mut LearnerState) -> HookResult {
        steps::calculate_loss(state)
    }

    fn backward(&mut self, state: &mut LearnerState) -> HookResult {
        steps::backward(state)
    }

    fn step(&mut self, state: &mut LearnerState) -> HookResult {
        steps::step(state)
    }

    fn zero_grad(&mut self, state: &mut LearnerState) -> HookResult {
        steps::zero_grad(state)
    }
}
