//! # aprendiz
//!
//! A small training framework built around a callback-driven loop.
//!
//! The [`train::Learner`] runs fit → epoch → batch and sequences the numeric
//! steps of each batch. Device placement, metrics, progress output, mixed
//! precision, learning-rate sweeps and early exits are all
//! [`train::Callback`]s that hook into named points of the loop, run in a
//! fixed order, and can cancel a batch, an epoch or the whole fit.
//!
//! ## Modules
//!
//! - [`train`]: learner, callbacks, losses, metrics, configuration
//! - [`data`]: datasets and batch loaders
//! - [`nn`]: model trait and a reference linear layer
//! - [`optim`]: optimizers and learning-rate schedulers
//! - [`precision`]: reduced precision and gradient scaling
//!
//! ## Example
//!
//! ```
//! use aprendiz::data::DataLoaders;
//! use aprendiz::nn::Linear;
//! use aprendiz::train::{
//!     Batch, FitOptions, Learner, LearnerConfig, MSELoss, ScopeOutcome, SingleBatchCallback,
//!     TrainCallback,
//! };
//! use ndarray::array;
//!
//! let batches = vec![Batch::pair(array![[0.0], [1.0]], array![[1.0], [3.0]]); 4];
//! let data = DataLoaders::new(batches.clone(), batches);
//! let mut learner = Learner::new(Linear::zeros(1, 1), data, MSELoss, LearnerConfig::default())
//!     .unwrap()
//!     .with_callback(TrainCallback::new());
//!
//! // Smoke-test the setup on a single batch
//! let outcome = learner
//!     .fit_with(FitOptions::new(2), vec![Box::new(SingleBatchCallback)])
//!     .unwrap();
//! assert!(outcome.is_cancelled());
//! assert_eq!(learner.callbacks().len(), 1);
//! ```

pub mod data;
pub mod error;
pub mod nn;
pub mod optim;
pub mod precision;
pub mod train;

pub use error::{Error, Result};

/// Dense 2-D tensor; rows are samples
pub type Tensor = ndarray::Array2<f32>;
