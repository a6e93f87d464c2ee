//! Cross-callback scenarios for the training module

use super::*;
use crate::train::learner::fixtures::{toy_learner, EventLog, Recorder};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_progress_redirects_metrics_table() {
    let buf = Rc::new(RefCell::new(Vec::<u8>::new()));
    let out: SharedWriter = buf.clone();
    let mut learner = toy_learner()
        .with_steps(TrainSteps)
        .with_callback(ProgressCallback::new().with_writer(out).with_plot(true))
        .with_callback(MetricsCallback::new().with_metric(MAE));

    learner.fit(FitOptions::new(2)).unwrap();

    let output = String::from_utf8(buf.borrow().clone()).unwrap();
    assert_eq!(output.matches("MAE\tloss\tepoch\ttrain").count(), 1);
    let train_rows = output
        .lines()
        .filter(|l| l.ends_with("\ttrain") && !l.starts_with("MAE"))
        .count();
    assert_eq!(train_rows, 2);
    assert_eq!(output.lines().filter(|l| l.ends_with("\teval")).count(), 2);
    assert!(output.contains("train ") && output.contains("│ valid "));
    assert!(learner.state().metrics_logger.is_none());
}

#[test]
fn test_progress_history_spans_fit() {
    let progress = ProgressCallback::new()
        .with_writer(Rc::new(RefCell::new(std::io::sink())))
        .with_plot(true);
    let history = progress.history();
    let mut learner = toy_learner()
        .with_steps(TrainSteps)
        .with_callback(MetricsCallback::new())
        .with_callback(progress);

    learner.fit(FitOptions::new(3)).unwrap();

    let history = history.borrow();
    assert_eq!(history.batch_losses.len(), 12);
    assert_eq!(history.validation_losses.len(), 3);
    assert_eq!(history.validation_steps, vec![4, 8, 12]);
}

#[test]
fn test_device_and_mixed_precision_train_together() {
    let log = EventLog::default();
    let watcher = Recorder::new("watcher", 20, &log).on(&[Hook::AfterPredict, Hook::AfterStep]);
    let mut learner = toy_learner()
        .with_callback(MixedPrecisionCallback::new(crate::precision::MixedPrecisionConfig::bf16()))
        .with_callback(DeviceCallback::new(crate::nn::Device::Cuda(0)))
        .with_callback(watcher);

    learner.fit(FitOptions::new(1)).unwrap();

    assert_eq!(learner.model().device(), crate::nn::Device::Cuda(0));
    assert_eq!(log.count("watcher:after_predict"), 6);
    assert_eq!(log.count("watcher:after_step"), 4);
    assert_eq!(learner.state().precision, crate::precision::Precision::Fp32);
}

#[test]
fn test_learner_order_listing() {
    let learner = toy_learner()
        .with_callback(ProgressCallback::new())
        .with_callback(SingleBatchCallback)
        .with_callback(MixedPrecisionCallback::default())
        .with_callback(MetricsCallback::new());

    assert_eq!(
        learner.callbacks().names(),
        vec!["MetricsCallback", "ProgressCallback", "SingleBatchCallback", "MixedPrecisionCallback"]
    );
}
