//! Stop after the first batch

use super::{Callback, Hook, HookResult, HookSet, Interrupt};
use crate::train::LearnerState;

/// Cancels the fit after one batch; useful for smoke-testing a setup
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleBatchCallback;

impl Callback for SingleBatchCallback {
    fn name(&self) -> &'static str {
        "SingleBatchCallback"
    }

    fn order(&self) -> i32 {
        1
    }

    fn hooks(&self) -> HookSet {
        HookSet::of(&[Hook::AfterBatch])
    }

    fn after_batch(&mut self, _state: &mut LearnerState) -> HookResult {
        Err(Interrupt::cancel_fit())
    }
}
