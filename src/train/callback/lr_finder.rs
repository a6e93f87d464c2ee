//! Learning-rate range test

use super::{Callback, Hook, HookResult, HookSet, Interrupt};
use crate::error::Error;
use crate::optim::{ExponentialLR, LRScheduler};
use crate::train::tui::sparkline;
use crate::train::LearnerState;
use std::cell::RefCell;
use std::rc::Rc;

/// Learning rates and losses recorded by an LR sweep
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LrSweep {
    /// Learning rate used for each batch
    pub learning_rates: Vec<f32>,
    /// Loss of each batch
    pub losses: Vec<f32>,
}

impl LrSweep {
    /// Number of recorded batches
    pub fn len(&self) -> usize {
        self.losses.len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.losses.is_empty()
    }

    /// Learning rate at which the lowest finite loss was seen
    pub fn min_loss_lr(&self) -> Option<f32> {
        self.losses
            .iter()
            .zip(&self.learning_rates)
            .filter(|(loss, _)| loss.is_finite())
            .min_by(|a, b| a.0.total_cmp(b.0))
            .map(|(_, lr)| *lr)
    }

    /// Loss curve as a sparkline
    pub fn render(&self, width: usize) -> String {
        sparkline(&self.losses, width)
    }
}

/// Grows the learning rate geometrically each training batch until the
/// loss diverges
///
/// The fit is cancelled once the loss is non-finite or exceeds the lowest
/// loss seen times `max_multiplier`. Validation passes are cancelled right
/// away. The sweep is available through [`LrFinderCallback::sweep`].
pub struct LrFinderCallback {
    lr_multiplier: f32,
    max_multiplier: f32,
    scheduler: Option<ExponentialLR>,
    min_loss: f32,
    sweep: Rc<RefCell<LrSweep>>,
}

impl LrFinderCallback {
    /// Create a finder
    pub fn new(lr_multiplier: f32, max_multiplier: f32) -> Self {
        Self {
            lr_multiplier,
            max_multiplier,
            scheduler: None,
            min_loss: f32::INFINITY,
            sweep: Rc::new(RefCell::new(LrSweep::default())),
        }
    }

    /// Handle to the recorded sweep
    pub fn sweep(&self) -> Rc<RefCell<LrSweep>> {
        Rc::clone(&self.sweep)
    }
}

impl Default for LrFinderCallback {
    fn default() -> Self {
        Self::new(1.3, 3.0)
    }
}

impl Callback for LrFinderCallback {
    fn name(&self) -> &'static str {
        "LrFinderCallback"
    }

    fn hooks(&self) -> HookSet {
        HookSet::of(&[Hook::BeforeFit, Hook::AfterBatch, Hook::CleanupFit])
    }

    fn before_fit(&mut self, state: &mut LearnerState) -> HookResult {
        let lr = state.optimizer_mut()?.lr();
        self.scheduler = Some(ExponentialLR::new(lr, self.lr_multiplier));
        self.min_loss = f32::INFINITY;
        *self.sweep.borrow_mut() = LrSweep::default();
        Ok(())
    }

    fn after_batch(&mut self, state: &mut LearnerState) -> HookResult {
        if !state.training() {
            return Err(Interrupt::cancel_epoch());
        }
        let loss = state.loss()?.value;
        let optimizer = state.optimizer_mut()?;
        {
            let mut sweep = self.sweep.borrow_mut();
            sweep.learning_rates.push(optimizer.lr());
            sweep.losses.push(loss);
        }

        if loss < self.min_loss {
            self.min_loss = loss;
        }
        if !loss.is_finite() || loss > self.min_loss * self.max_multiplier {
            tracing::debug!(loss, min_loss = self.min_loss, "loss diverged");
            return Err(Interrupt::cancel_fit());
        }

        let scheduler = self.scheduler.as_mut().ok_or(Error::MissingState("lr scheduler"))?;
        scheduler.step();
        scheduler.apply(optimizer);
        Ok(())
    }

    fn cleanup_fit(&mut self, _state: &mut LearnerState) -> HookResult {
        let sweep = self.sweep.borrow();
        let lrs = &sweep.learning_rates;
        if let (Some(first), Some(last)) = (lrs.first(), lrs.last()) {
            tracing::info!(
                batches = sweep.len(),
                from = first,
                to = last,
                suggestion = ?sweep.min_loss_lr(),
                curve = %sweep.render(40),
                "lr sweep"
            );
        }
        Ok(())
    }
}
