//! Callback system for the training loop
//!
//! A callback hooks into named points of the fit → epoch → batch loop:
//!
//! - `before_*` / `after_*` / `cleanup_*` for each [`Scope`]
//! - `after_predict`, `after_loss`, `after_backward`, `after_step`
//! - the numeric steps `predict`, `calculate_loss`, `backward`, `step`,
//!   `zero_grad`, used when the learner has no step provider
//!
//! Callbacks run in ascending [`Callback::order`] and may stop a scope early
//! by returning [`Interrupt::Cancel`].
//!
//! # Example
//!
//! ```
//! use aprendiz::train::{Callback, Hook, HookResult, HookSet, Interrupt, LearnerState};
//!
//! /// Stop training once the loss is low enough
//! struct StopBelow(f32);
//!
//! impl Callback for StopBelow {
//!     fn hooks(&self) -> HookSet {
//!         HookSet::of(&[Hook::AfterLoss])
//!     }
//!
//!     fn after_loss(&mut self, state: &mut LearnerState) -> HookResult {
//!         if state.loss()?.value < self.0 {
//!             return Err(Interrupt::cancel_fit());
//!         }
//!         Ok(())
//!     }
//! }
//! ```

mod activations;
mod device;
mod hooks;
mod lr_finder;
mod manager;
mod metrics;
mod mixed_precision;
mod progress;
mod signal;
mod single_batch;
mod train;
mod traits;

pub use activations::{ActivationStatisticsCallback, ActivationStats};
pub use device::DeviceCallback;
pub use hooks::{Hook, HookSet, Scope, ScopeOutcome};
pub use lr_finder::{LrFinderCallback, LrSweep};
pub use manager::{run_callbacks, CallbackId, CallbackManager};
pub use metrics::{MetricsCallback, MetricsLogger, MetricsRecord, PrintLogger};
pub use mixed_precision::MixedPrecisionCallback;
pub use progress::{LossHistory, ProgressCallback, SharedWriter};
pub use signal::{HookResult, Interrupt};
pub use single_batch::SingleBatchCallback;
pub use train::TrainCallback;
pub use traits::{invoke, Callback};
