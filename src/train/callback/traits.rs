//! The callback trait
//!
//! A callback declares the hooks it implements with [`Callback::hooks`] and
//! overrides the matching methods. Undeclared hooks are never dispatched, so
//! the default no-op bodies only matter for direct calls.

use super::hooks::{Hook, HookSet};
use super::signal::HookResult;
use crate::train::LearnerState;

/// Trait for training callbacks
///
/// # Example
///
/// ```
/// use aprendiz::train::{Callback, Hook, HookResult, HookSet, LearnerState};
///
/// struct EpochPrinter;
///
/// impl Callback for EpochPrinter {
///     fn name(&self) -> &'static str {
///         "EpochPrinter"
///     }
///
///     fn hooks(&self) -> HookSet {
///         HookSet::of(&[Hook::AfterEpoch])
///     }
///
///     fn after_epoch(&mut self, state: &mut LearnerState) -> HookResult {
///         println!("finished epoch {}", state.epoch);
///         Ok(())
///     }
/// }
/// ```
pub trait Callback {
    /// Get callback name for logging
    fn name(&self) -> &'static str {
        "Callback"
    }

    /// Ordering key; lower runs first, ties keep insertion order
    fn order(&self) -> i32 {
        0
    }

    /// Hooks this callback implements
    fn hooks(&self) -> HookSet;

    fn before_fit(&mut self, _state: &mut LearnerState) -> HookResult {
        Ok(())
    }

    fn after_fit(&mut self, _state: &mut LearnerState) -> HookResult {
        Ok(())
    }

    fn cleanup_fit(&mut self, _state: &mut LearnerState) -> HookResult {
        Ok(())
    }

    fn before_epoch(&mut self, _state: &mut LearnerState) -> HookResult {
        Ok(())
    }

    fn after_epoch(&mut self, _state: &mut LearnerState) -> HookResult {
        Ok(())
    }

    fn cleanup_epoch(&mut self, _state: &mut LearnerState) -> HookResult {
        Ok(())
    }

    fn before_batch(&mut self, _state: &mut LearnerState) -> HookResult {
        Ok(())
    }

    fn after_batch(&mut self, _state: &mut LearnerState) -> HookResult {
        Ok(())
    }

    fn cleanup_batch(&mut self, _state: &mut LearnerState) -> HookResult {
        Ok(())
    }

    fn after_predict(&mut self, _state: &mut LearnerState) -> HookResult {
        Ok(())
    }

    fn after_loss(&mut self, _state: &mut LearnerState) -> HookResult {
        Ok(())
    }

    fn after_backward(&mut self, _state: &mut LearnerState) -> HookResult {
        Ok(())
    }

    fn after_step(&mut self, _state: &mut LearnerState) -> HookResult {
        Ok(())
    }

    fn predict(&mut self, _state: &mut LearnerState) -> HookResult {
        Ok(())
    }

    fn calculate_loss(&mut self, _state: &mut LearnerState) -> HookResult {
        Ok(())
    }

    fn backward(&mut self, _state: &mut LearnerState) -> HookResult {
        Ok(())
    }

    fn step(&mut self, _state: &mut LearnerState) -> HookResult {
        Ok(())
    }

    fn zero_grad(&mut self, _state: &mut LearnerState) -> HookResult {
        Ok(())
    }
}

/// Invoke the method of `callback` that corresponds to `hook`
pub fn invoke(callback: &mut dyn Callback, hook: Hook, state: &mut LearnerState) -> HookResult {
    match hook {
        Hook::BeforeFit => callback.before_fit(state),
        Hook::AfterFit => callback.after_fit(state),
        Hook::CleanupFit => callback.cleanup_fit(state),
        Hook::BeforeEpoch => callback.before_epoch(state),
        Hook::AfterEpoch => callback.after_epoch(state),
        Hook::CleanupEpoch => callback.cleanup_epoch(state),
        Hook::BeforeBatch => callback.before_batch(state),
        Hook::AfterBatch => callback.after_batch(state),
        Hook::CleanupBatch => callback.cleanup_batch(state),
        Hook::AfterPredict => callback.after_predict(state),
        Hook::AfterLoss => callback.after_loss(state),
        Hook::AfterBackward => callback.after_backward(state),
        Hook::AfterStep => callback.after_step(state),
        Hook::Predict => callback.predict(state),
        Hook::CalculateLoss => callback.calculate_loss(state),
        Hook::Backward => callback.backward(state),
        Hook::Step => callback.step(state),
        Hook::ZeroGrad => callback.zero_grad(state),
    }
}
