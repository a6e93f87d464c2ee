//! Mutable training state shared by the loop and its callbacks

use crate::data::{Batches, DataLoaders};
use crate::error::{Error, Result};
use crate::nn::Model;
use crate::optim::Optimizer;
use crate::precision::Precision;
use crate::train::callback::{MetricsLogger, MetricsRecord};
use crate::train::{Batch, Loss, LossFn};
use crate::Tensor;
use std::ops::Range;

/// Everything a hook may read or modify
///
/// The learner owns one `LearnerState` and passes it by `&mut` to every
/// hook. Callbacks communicate only through these fields.
pub struct LearnerState {
    /// Model under training
    pub model: Box<dyn Model>,
    /// Loss function
    pub loss_fn: Box<dyn LossFn>,
    /// Training and validation sources
    pub data: DataLoaders,
    /// Default learning rate
    pub learning_rate: f32,
    /// Leading batch tensors fed to the model
    pub num_inputs: usize,
    /// Optimizer of the current `fit` call
    pub optimizer: Option<Box<dyn Optimizer>>,
    /// Epochs of the current `fit` call
    pub epochs: Range<usize>,
    /// Current epoch index
    pub epoch: usize,
    /// Batches of the current pass; callbacks may wrap the iterator in `before_epoch`
    pub batches: Option<Batches>,
    /// Number of batches in the current pass
    pub num_batches: usize,
    /// 0-based index of the current batch within its pass
    pub iteration: usize,
    /// Batch in flight
    pub batch: Option<Batch>,
    /// Output of the last `predict`
    pub predictions: Option<Tensor>,
    /// Output of the last `calculate_loss`
    pub loss: Option<Loss>,
    /// Compute precision of the forward pass
    pub precision: Precision,
    /// Latest record published by the metrics callback
    pub metrics: Option<MetricsRecord>,
    /// Replacement for the metrics callback's own logger
    pub metrics_logger: Option<Box<dyn MetricsLogger>>,
}

impl LearnerState {
    /// Create idle state
    pub fn new(
        model: Box<dyn Model>,
        loss_fn: Box<dyn LossFn>,
        data: DataLoaders,
        learning_rate: f32,
        num_inputs: usize,
    ) -> Self {
        Self {
            model,
            loss_fn,
            data,
            learning_rate,
            num_inputs,
            optimizer: None,
            epochs: 0..0,
            epoch: 0,
            batches: None,
            num_batches: 0,
            iteration: 0,
            batch: None,
            predictions: None,
            loss: None,
            precision: Precision::Fp32,
            metrics: None,
            metrics_logger: None,
        }
    }

    /// Training mode, as reported by the model
    pub fn training(&self) -> bool {
        self.model.is_training()
    }

    /// Batch in flight
    pub fn batch(&self) -> Result<&Batch> {
        self.batch.as_ref().ok_or(Error::MissingState("batch"))
    }

    /// Predictions of the batch in flight
    pub fn predictions(&self) -> Result<&Tensor> {
        self.predictions.as_ref().ok_or(Error::MissingState("predictions"))
    }

    /// Loss of the batch in flight
    pub fn loss(&self) -> Result<&Loss> {
        self.loss.as_ref().ok_or(Error::MissingState("loss"))
    }

    /// Optimizer of the current fit
    pub fn optimizer_mut(&mut self) -> Result<&mut dyn Optimizer> {
        match self.optimizer.as_mut() {
            Some(optimizer) => Ok(optimizer.as_mut()),
            None => Err(Error::MissingState("optimizer")),
        }
    }

    /// Set model mode and prepare the batches of one pass
    pub(crate) fn start_pass(&mut self, training: bool) {
        self.model.set_training(training);
        let source = self.data.get_mut(training);
        self.num_batches = source.len();
        self.batches = Some(source.batches());
    }

    /// Drop per-batch values before a new batch
    pub(super) fn clear_batch_outputs(&mut self) {
        self.predictions = None;
        self.loss = None;
    }
}
