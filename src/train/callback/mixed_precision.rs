//! Mixed-precision training steps

use super::{Callback, DeviceCallback, Hook, HookResult, HookSet};
use crate::error::Error;
use crate::precision::{GradScaler, MixedPrecisionConfig, Precision};
use crate::train::learner::steps;
use crate::train::LearnerState;

/// Training steps with a reduced-precision forward pass and loss scaling
///
/// The forward pass and loss run in `compute_precision` between
/// `before_batch` and `after_loss`. The loss gradient is multiplied by the
/// scaler's loss scale before backward; `step` unscales the gradients and
/// skips the update when they overflowed.
pub struct MixedPrecisionCallback {
    config: MixedPrecisionConfig,
    scaler: GradScaler,
}

impl MixedPrecisionCallback {
    /// Create from a precision config
    pub fn new(config: MixedPrecisionConfig) -> Self {
        let scaler = GradScaler::from_config(&config);
        Self { config, scaler }
    }

    /// Scaler state
    pub fn scaler(&self) -> &GradScaler {
        &self.scaler
    }
}

impl Default for MixedPrecisionCallback {
    fn default() -> Self {
        Self::new(MixedPrecisionConfig::default())
    }
}

impl Callback for MixedPrecisionCallback {
    fn name(&self) -> &'static str {
        "MixedPrecisionCallback"
    }

    fn order(&self) -> i32 {
        DeviceCallback::ORDER + 10
    }

    fn hooks(&self) -> HookSet {
        HookSet::NUMERIC_STEPS.union(HookSet::of(&[
            Hook::BeforeFit,
            Hook::BeforeBatch,
            Hook::AfterLoss,
            Hook::CleanupBatch,
        ]))
    }

    fn before_fit(&mut self, _state: &mut LearnerState) -> HookResult {
        self.scaler = GradScaler::from_config(&self.config);
        Ok(())
    }

    fn before_batch(&mut self, state: &mut LearnerState) -> HookResult {
        state.precision = self.config.compute_precision;
        Ok(())
    }

    fn after_loss(&mut self, state: &mut LearnerState) -> HookResult {
        state.precision = Precision::Fp32;
        Ok(())
    }

    fn cleanup_batch(&mut self, state: &mut LearnerState) -> HookResult {
        state.precision = Precision::Fp32;
        Ok(())
    }

    fn predict(&mut self, state: &mut LearnerState) -> HookResult {
        steps::predict(state)?;
        let precision = state.precision;
        if precision.is_reduced() {
            if let Some(predictions) = state.predictions.as_mut() {
                predictions.mapv_inplace(|v| precision.round(v));
            }
        }
        Ok(())
    }

    fn calculate_loss(&mut self, state: &mut LearnerState) -> HookResult {
        steps::calculate_loss(state)
    }

    fn backward(&mut self, state: &mut LearnerState) -> HookResult {
        let loss = state.loss.as_ref().ok_or(Error::MissingState("loss"))?;
        loss.scaled(self.scaler.scale()).backward(state.model.as_mut())?;
        Ok(())
    }

    fn step(&mut self, state: &mut LearnerState) -> HookResult {
        let optimizer = state.optimizer.as_mut().ok_or(Error::MissingState("optimizer"))?;
        let mut params = state.model.parameters_mut();
        let valid = self.scaler.unscale_params(&mut params);
        if valid {
            optimizer.step(&mut params);
        } else {
            tracing::warn!(scale = self.scaler.scale(), "gradient overflow, skipping step");
        }
        self.scaler.update(valid);
        Ok(())
    }

    fn zero_grad(&mut self, state: &mut LearnerState) -> HookResult {
        steps::zero_grad(state)
    }
}
