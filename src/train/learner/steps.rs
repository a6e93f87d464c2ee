//! Numeric work of one batch
//!
//! The learner asks a [`NumericSteps`] provider for each step it supplies
//! and dispatches the remaining steps as hooks, so a plain callback such as
//! `TrainCallback` can supply them instead.

use super::LearnerState;
use crate::error::Error;
use crate::train::callback::{Hook, HookResult, HookSet};

/// One of the five numeric sub-steps of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericStep {
    Predict,
    CalculateLoss,
    Backward,
    Step,
    ZeroGrad,
}

impl NumericStep {
    /// Hook that supplies this step when no provider does
    pub fn hook(self) -> Hook {
        match self {
            NumericStep::Predict => Hook::Predict,
            NumericStep::CalculateLoss => Hook::CalculateLoss,
            NumericStep::Backward => Hook::Backward,
            NumericStep::Step => Hook::Step,
            NumericStep::ZeroGrad => Hook::ZeroGrad,
        }
    }

    pub(super) fn run(self, steps: &mut dyn NumericSteps, state: &mut LearnerState) -> HookResult {
        match self {
            NumericStep::Predict => steps.predict(state),
            NumericStep::CalculateLoss => steps.calculate_loss(state),
            NumericStep::Backward => steps.backward(state),
            NumericStep::Step => steps.step(state),
            NumericStep::ZeroGrad => steps.zero_grad(state),
        }
    }
}

/// Provider of numeric steps chosen at learner construction
///
/// Every method defaults to the standard training step; implementors
/// override what they change and narrow [`NumericSteps::supplies`] to hand
/// steps back to the callbacks.
pub trait NumericSteps {
    /// Provider name for logging
    fn name(&self) -> &'static str {
        "NumericSteps"
    }

    /// Steps this provider supplies
    fn supplies(&self) -> HookSet {
        HookSet::NUMERIC_STEPS
    }

    fn predict(&mut self, state: &mut LearnerState) -> HookResult {
        predict(state)
    }

    fn calculate_loss(&mut self, state: &mut LearnerState) -> HookResult {
        calculate_loss(state)
    }

    fn backward(&mut self, state: &mut LearnerState) -> HookResult {
        backward(state)
    }

    fn step(&mut self, state: &mut LearnerState) -> HookResult {
        step(state)
    }

    fn zero_grad(&mut self, state: &mut LearnerState) -> HookResult {
        zero_grad(state)
    }
}

/// Run the model on the inputs of the batch in flight
pub fn predict(state: &mut LearnerState) -> HookResult {
    let batch = state.batch.as_ref().ok_or(Error::MissingState("batch"))?;
    let predictions = state.model.forward(batch.inputs(state.num_inputs))?;
    state.predictions = Some(predictions);
    Ok(())
}

/// Compare predictions with the targets of the batch in flight
pub fn calculate_loss(state: &mut LearnerState) -> HookResult {
    let batch = state.batch.as_ref().ok_or(Error::MissingState("batch"))?;
    let predictions = state.predictions.as_ref().ok_or(Error::MissingState("predictions"))?;
    let loss = state.loss_fn.forward(predictions, batch.targets(state.num_inputs))?;
    state.loss = Some(loss);
    Ok(())
}

/// Backpropagate the current loss
pub fn backward(state: &mut LearnerState) -> HookResult {
    let loss = state.loss.as_ref().ok_or(Error::MissingState("loss"))?;
    loss.backward(state.model.as_mut())?;
    Ok(())
}

/// Apply one optimizer update
pub fn step(state: &mut LearnerState) -> HookResult {
    let optimizer = state.optimizer.as_mut().ok_or(Error::MissingState("optimizer"))?;
    let mut params = state.model.parameters_mut();
    optimizer.step(&mut params);
    Ok(())
}

/// Clear accumulated gradients
pub fn zero_grad(state: &mut LearnerState) -> HookResult {
    let optimizer = state.optimizer.as_mut().ok_or(Error::MissingState("optimizer"))?;
    let mut params = state.model.parameters_mut();
    optimizer.zero_grad(&mut params);
    Ok(())
}

/// Standard training steps
#[derive(Debug, Clone, Copy, Default)]
pub struct TrainSteps;

impl NumericSteps for TrainSteps {
    fn name(&self) -> &'static str {
        "TrainSteps"
    }
}

/// Training steps that decay gradients instead of clearing them
///
/// `zero_grad` multiplies every gradient by `momentum`, so each update sees
/// an exponentially weighted sum of past gradients.
#[derive(Debug, Clone, Copy)]
pub struct MomentumSteps {
    momentum: f32,
}

impl MomentumSteps {
    /// Create with the given decay factor
    pub fn new(momentum: f32) -> Self {
        Self { momentum }
    }

    /// Decay factor
    pub fn momentum(&self) -> f32 {
        self.momentum
    }
}

impl Default for MomentumSteps {
    fn default() -> Self {
        Self::new(0.85)
    }
}

impl NumericSteps for MomentumSteps {
    fn name(&self) -> &'static str {
        "MomentumSteps"
    }

    fn zero_grad(&mut self, state: &mut LearnerState) -> HookResult {
        for param in state.model.parameters_mut() {
            param.grad *= self.momentum;
        }
        Ok(())
    }
}
