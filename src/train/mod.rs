//! Callback-driven training loop
//!
//! This module provides:
//! - `Learner`: the fit → epoch → batch loop with scoped hooks
//! - The callback protocol, ordered dispatch and cancellation signals
//! - Built-in callbacks (device, metrics, progress, training steps, mixed
//!   precision, learning-rate finder, single batch, activation statistics)
//! - Loss functions, metrics and learner configuration
//!
//! # Example
//!
//! ```
//! use aprendiz::data::{DataLoaders, Dataset};
//! use aprendiz::nn::Linear;
//! use aprendiz::train::{
//!     FitOptions, Learner, LearnerConfig, MSELoss, MetricsCallback, TrainSteps, MAE,
//! };
//! use ndarray::Array2;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let x = Array2::from_shape_fn((32, 1), |(i, _)| i as f32 / 32.0);
//! let y = x.mapv(|v| 3.0 * v - 1.0);
//! let train = Dataset::new(x.clone(), y.clone()).unwrap();
//! let valid = Dataset::new(x, y).unwrap();
//! let data = DataLoaders::from_datasets(train, valid, 8, StdRng::seed_from_u64(42));
//!
//! let mut learner = Learner::new(Linear::zeros(1, 1), data, MSELoss, LearnerConfig::default())
//!     .unwrap()
//!     .with_steps(TrainSteps)
//!     .with_callback(MetricsCallback::new().with_metric(MAE));
//! learner.fit(FitOptions::new(2)).unwrap();
//!
//! let record = learner.state().metrics.as_ref().unwrap();
//! assert!(!record.training);
//! assert!(record.loss().is_some());
//! ```

mod batch;
pub mod callback;
mod config;
pub mod learner;
mod loss;
mod metrics;
pub mod tui;

#[cfg(test)]
mod tests;

pub use batch::Batch;
pub use callback::{
    run_callbacks, ActivationStatisticsCallback, ActivationStats, Callback, CallbackId,
    CallbackManager, DeviceCallback, Hook, HookResult, HookSet, Interrupt, LossHistory,
    LrFinderCallback, LrSweep, MetricsCallback, MetricsLogger, MetricsRecord,
    MixedPrecisionCallback, PrintLogger, ProgressCallback, Scope, ScopeOutcome, SharedWriter,
    SingleBatchCallback, TrainCallback,
};
pub use config::{BatchCancelPolicy, FitOptions, LearnerConfig};
pub use learner::{
    Learner, LearnerState, LrFindOptions, ModelSummary, MomentumSteps, NumericStep, NumericSteps,
    TrainSteps,
};
pub use loss::{Loss, LossFn, MSELoss};
pub use metrics::{Accuracy, Metric, RunningMean, MAE};
