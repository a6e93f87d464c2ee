//! Per-epoch metric aggregation

use super::{Callback, Hook, HookResult, HookSet};
use crate::error::Error;
use crate::train::{LearnerState, Metric, RunningMean};
use std::fmt;

/// Metric values of one finished epoch pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsRecord {
    /// Epoch index
    pub epoch: usize,
    /// Whether the pass was a training pass
    pub training: bool,
    /// Metric values in registration order, loss last
    pub values: Vec<(String, f32)>,
}

impl MetricsRecord {
    /// Look up a value by metric name
    pub fn get(&self, name: &str) -> Option<f32> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    /// Mean loss of the pass
    pub fn loss(&self) -> Option<f32> {
        self.get("loss")
    }

    /// Pass kind label
    pub fn mode(&self) -> &'static str {
        if self.training {
            "train"
        } else {
            "eval"
        }
    }

    /// Column names of the table row
    pub fn columns(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|(name, _)| name.clone())
            .chain(["epoch".to_string(), "train".to_string()])
            .collect()
    }

    /// Cells of the table row
    pub fn cells(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|(_, value)| format!("{value:.3}"))
            .chain([self.epoch.to_string(), self.mode().to_string()])
            .collect()
    }
}

impl fmt::Display for MetricsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch {} {}", self.epoch, self.mode())?;
        for (name, value) in &self.values {
            write!(f, " │ {name} {value:.4}")?;
        }
        Ok(())
    }
}

/// Destination of finished metric records
pub trait MetricsLogger {
    /// Log one record
    fn log(&mut self, record: &MetricsRecord) -> crate::error::Result<()>;
}

/// Logger that prints one line per record to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintLogger;

impl MetricsLogger for PrintLogger {
    fn log(&mut self, record: &MetricsRecord) -> crate::error::Result<()> {
        println!("{record}");
        Ok(())
    }
}

/// Aggregates the loss and user metrics over each epoch pass
///
/// Every value is a running mean weighted by batch size and is reset at the
/// start of each pass. The finished record is stored in
/// `LearnerState::metrics` and sent to `LearnerState::metrics_logger` when
/// another callback installed one, or to this callback's own logger.
///
/// # Example
///
/// ```
/// use aprendiz::train::{Accuracy, MetricsCallback};
///
/// let metrics = MetricsCallback::new().with_metric(Accuracy::default());
/// assert_eq!(metrics.metric_names(), vec!["Accuracy", "loss"]);
/// ```
pub struct MetricsCallback {
    metrics: Vec<(Box<dyn Metric>, RunningMean)>,
    loss: RunningMean,
    logger: Box<dyn MetricsLogger>,
}

impl MetricsCallback {
    /// Ordering key; the progress callback runs right after it
    pub const ORDER: i32 = 0;

    /// Track the loss only
    pub fn new() -> Self {
        Self {
            metrics: Vec::new(),
            loss: RunningMean::new(),
            logger: Box::new(PrintLogger),
        }
    }

    /// Track an additional metric
    pub fn with_metric(mut self, metric: impl Metric + 'static) -> Self {
        self.metrics.push((Box::new(metric), RunningMean::new()));
        self
    }

    /// Replace the default print logger
    pub fn with_logger(mut self, logger: impl MetricsLogger + 'static) -> Self {
        self.logger = Box::new(logger);
        self
    }

    /// Names of the tracked values, loss last
    pub fn metric_names(&self) -> Vec<String> {
        self.metrics
            .iter()
            .map(|(metric, _)| metric.name().to_string())
            .chain(["loss".to_string()])
            .collect()
    }

    fn reset(&mut self) {
        for (_, mean) in &mut self.metrics {
            mean.reset();
        }
        self.loss.reset();
    }

    fn record(&self, state: &LearnerState) -> MetricsRecord {
        let values = self
            .metrics
            .iter()
            .map(|(metric, mean)| (metric.name().to_string(), mean.compute().unwrap_or(f32::NAN)))
            .chain([("loss".to_string(), self.loss.compute().unwrap_or(f32::NAN))])
            .collect();
        MetricsRecord {
            epoch: state.epoch,
            training: state.training(),
            values,
        }
    }
}

impl Default for MetricsCallback {
    fn default() -> Self {
        Self::new()
    }
}

impl Callback for MetricsCallback {
    fn name(&self) -> &'static str {
        "MetricsCallback"
    }

    fn order(&self) -> i32 {
        Self::ORDER
    }

    fn hooks(&self) -> HookSet {
        HookSet::of(&[Hook::BeforeFit, Hook::BeforeEpoch, Hook::AfterBatch, Hook::AfterEpoch])
    }

    fn before_fit(&mut self, state: &mut LearnerState) -> HookResult {
        state.metrics = Some(MetricsRecord::default());
        Ok(())
    }

    fn before_epoch(&mut self, _state: &mut LearnerState) -> HookResult {
        self.reset();
        Ok(())
    }

    fn after_batch(&mut self, state: &mut LearnerState) -> HookResult {
        let batch = state.batch.as_ref().ok_or(Error::MissingState("batch"))?;
        let weight = batch.len() as f32;
        let predictions = state.predictions.as_ref().ok_or(Error::MissingState("predictions"))?;
        let targets = batch
            .targets(state.num_inputs)
            .first()
            .ok_or(Error::MissingState("targets"))?;

        for (metric, mean) in &mut self.metrics {
            mean.update(metric.compute(predictions, targets)?, weight);
        }
        let loss = state.loss.as_ref().ok_or(Error::MissingState("loss"))?;
        self.loss.update(loss.value, weight);
        Ok(())
    }

    fn after_epoch(&mut self, state: &mut LearnerState) -> HookResult {
        let record = self.record(state);
        tracing::info!(
            epoch = record.epoch,
            mode = record.mode(),
            loss = ?record.loss(),
            "epoch metrics"
        );
        match state.metrics_logger.as_mut() {
            Some(logger) => logger.log(&record)?,
            None => self.logger.log(&record)?,
        }
        state.metrics = Some(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::learner::fixtures::toy_state;
    use crate::train::{Accuracy, Batch, Loss, MAE};
    use crate::Tensor;
    use approx::assert_abs_diff_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Collect(Rc<RefCell<Vec<MetricsRecord>>>);

    impl MetricsLogger for Collect {
        fn log(&mut self, record: &MetricsRecord) -> crate::error::Result<()> {
            self.0.borrow_mut().push(record.clone());
            Ok(())
        }
    }

    fn feed(cb: &mut MetricsCallback, state: &mut LearnerState, rows: usize, loss: f32) {
        state.batch = Some(Batch::pair(Tensor::zeros((rows, 1)), Tensor::zeros((rows, 1))));
        state.predictions = Some(Tensor::from_elem((rows, 1), loss));
        state.loss = Some(Loss {
            value: loss,
            grad: Tensor::zeros((rows, 1)),
        });
        cb.after_batch(state).unwrap();
    }

    #[test]
    fn test_weighted_mean_and_reset() {
        let sink = Collect::default();
        let mut cb = MetricsCallback::new().with_metric(MAE).with_logger(sink.clone());
        let mut state = toy_state();

        cb.before_fit(&mut state).unwrap();
        cb.before_epoch(&mut state).unwrap();
        feed(&mut cb, &mut state, 3, 1.0);
        feed(&mut cb, &mut state, 1, 5.0);
        cb.after_epoch(&mut state).unwrap();

        let record = state.metrics.clone().unwrap();
        // (1*3 + 5*1) / 4
        assert_abs_diff_eq!(record.loss().unwrap(), 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(record.get("MAE").unwrap(), 2.0, epsilon = 1e-6);
        assert_eq!(sink.0.borrow().len(), 1);

        cb.before_epoch(&mut state).unwrap();
        feed(&mut cb, &mut state, 2, 0.5);
        cb.after_epoch(&mut state).unwrap();
        assert_abs_diff_eq!(state.metrics.as_ref().unwrap().loss().unwrap(), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_installed_logger_takes_over() {
        let own = Collect::default();
        let redirected = Collect::default();
        let mut cb = MetricsCallback::new().with_logger(own.clone());
        let mut state = toy_state();
        state.metrics_logger = Some(Box::new(redirected.clone()));

        cb.before_epoch(&mut state).unwrap();
        feed(&mut cb, &mut state, 1, 1.0);
        cb.after_epoch(&mut state).unwrap();

        assert!(own.0.borrow().is_empty());
        assert_eq!(redirected.0.borrow().len(), 1);
    }

    #[test]
    fn test_missing_loss_is_an_error() {
        let mut cb = MetricsCallback::new();
        let mut state = toy_state();
        state.batch = Some(Batch::pair(Tensor::zeros((1, 1)), Tensor::zeros((1, 1))));
        state.predictions = Some(Tensor::zeros((1, 1)));
        assert!(cb.after_batch(&mut state).is_err());
    }

    #[test]
    fn test_record_table() {
        let record = MetricsRecord {
            epoch: 2,
            training: false,
            values: vec![("accuracy".into(), 0.5), ("loss".into(), 0.25)],
        };
        assert_eq!(record.columns(), vec!["accuracy", "loss", "epoch", "train"]);
        assert_eq!(record.cells(), vec!["0.500", "0.250", "2", "eval"]);
        assert_eq!(record.to_string(), "epoch 2 eval │ accuracy 0.5000 │ loss 0.2500");
        let cb = MetricsCallback::new().with_metric(Accuracy::default());
        assert_eq!(cb.metric_names(), vec!["Accuracy", "loss"]);
    }
}
