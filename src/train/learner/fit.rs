//! fit → epoch → batch orchestration

use super::steps::NumericStep;
use super::Learner;
use crate::error::Result;
use crate::train::callback::{
    Callback, CallbackId, Hook, HookResult, Interrupt, Scope, ScopeOutcome,
};
use crate::train::{BatchCancelPolicy, FitOptions};
use std::ops::{Deref, DerefMut};

/// Callbacks registered for the duration of one `fit` call
///
/// Dropping the guard unregisters them, including when `fit` returns an
/// error or unwinds.
struct TemporaryCallbacks<'a> {
    learner: &'a mut Learner,
    ids: Vec<CallbackId>,
}

impl<'a> TemporaryCallbacks<'a> {
    fn attach(learner: &'a mut Learner, callbacks: Vec<Box<dyn Callback>>) -> Self {
        let ids = callbacks
            .into_iter()
            .map(|cb| learner.callbacks.add_boxed(cb))
            .collect();
        Self { learner, ids }
    }
}

impl Deref for TemporaryCallbacks<'_> {
    type Target = Learner;

    fn deref(&self) -> &Learner {
        &*self.learner
    }
}

impl DerefMut for TemporaryCallbacks<'_> {
    fn deref_mut(&mut self) -> &mut Learner {
        &mut *self.learner
    }
}

impl Drop for TemporaryCallbacks<'_> {
    fn drop(&mut self) {
        for id in self.ids.drain(..) {
            self.learner.callbacks.remove(id);
        }
    }
}

impl Learner {
    /// Train and/or validate for `options.num_epochs` epochs
    ///
    /// Returns how the fit scope ended: `Cancelled(Fit)` when a callback
    /// stopped training early.
    pub fn fit(&mut self, options: FitOptions) -> Result<ScopeOutcome> {
        self.fit_with(options, Vec::new())
    }

    /// Like [`Learner::fit`], with callbacks that are only registered for
    /// this call
    pub fn fit_with(
        &mut self,
        options: FitOptions,
        extra_callbacks: Vec<Box<dyn Callback>>,
    ) -> Result<ScopeOutcome> {
        options.validate()?;
        let mut learner = TemporaryCallbacks::attach(self, extra_callbacks);
        learner.run_fit(&options)
    }

    fn run_fit(&mut self, options: &FitOptions) -> Result<ScopeOutcome> {
        self.state.epochs = 0..options.num_epochs;
        let lr = options.learning_rate.unwrap_or(self.state.learning_rate);
        if let Some(factory) = &self.optimizer_factory {
            self.state.optimizer = Some(factory(lr));
        }
        tracing::info!(
            epochs = options.num_epochs,
            lr,
            train = options.train,
            valid = options.valid,
            callbacks = ?self.callbacks.names(),
            "fit"
        );

        let outcome = self
            .with_scope(Scope::Fit, |learner| {
                for epoch in learner.state.epochs.clone() {
                    learner.state.epoch = epoch;
                    if options.train {
                        learner.one_epoch(true)?;
                    }
                    if options.valid {
                        learner.one_epoch(false)?;
                    }
                }
                Ok(())
            })
            .map_err(Interrupt::into_error)?;

        self.state.batches = None;
        self.state.batch = None;
        Ok(outcome)
    }

    /// One training or validation pass over the matching data source
    fn one_epoch(&mut self, training: bool) -> std::result::Result<ScopeOutcome, Interrupt> {
        self.state.start_pass(training);
        let outcome = self.with_scope(Scope::Epoch, Learner::run_batches);
        self.state.batches = None;
        outcome
    }

    fn run_batches(&mut self) -> HookResult {
        let mut iteration = 0;
        while let Some(batch) = self.state.batches.as_mut().and_then(Iterator::next) {
            self.state.iteration = iteration;
            self.state.batch = Some(batch);
            self.state.clear_batch_outputs();

            let outcome = self.with_scope(Scope::Batch, Learner::one_batch)?;
            if outcome.is_cancelled() && self.config.batch_cancel == BatchCancelPolicy::EndEpoch {
                tracing::debug!(epoch = self.state.epoch, iteration, "batch cancel ends the pass");
                break;
            }
            iteration += 1;
        }
        Ok(())
    }

    fn one_batch(&mut self) -> HookResult {
        self.numeric_step(NumericStep::Predict)?;
        self.dispatch(Hook::AfterPredict)?;
        self.numeric_step(NumericStep::CalculateLoss)?;
        self.dispatch(Hook::AfterLoss)?;
        if self.state.training() {
            self.numeric_step(NumericStep::Backward)?;
            self.dispatch(Hook::AfterBackward)?;
            self.numeric_step(NumericStep::Step)?;
            self.dispatch(Hook::AfterStep)?;
            self.numeric_step(NumericStep::ZeroGrad)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::train::learner::fixtures::{toy_learner, toy_learner_with, EventLog, Recorder};
    use crate::train::learner::steps::TrainSteps;
    use crate::train::LearnerConfig;

    fn observed(log: &EventLog) -> Learner {
        toy_learner().with_steps(TrainSteps).with_callback(Recorder::observer("r", 0, log))
    }

    #[test]
    fn test_hook_sequence_of_one_training_batch() {
        let log = EventLog::default();
        let mut learner = observed(&log);
        learner.fit(FitOptions::new(1).with_valid(false)).unwrap();

        let events = log.events();
        let first_batch: Vec<&str> = events.iter().skip(2).take(6).map(String::as_str).collect();
        assert_eq!(
            first_batch,
            vec![
                "r:before_batch",
                "r:after_predict",
                "r:after_loss",
                "r:after_backward",
                "r:after_step",
                "r:after_batch"
            ]
        );
        assert_eq!(log.count("r:after_batch"), 4);
        assert_eq!(events.last().map(String::as_str), Some("r:cleanup_fit"));
    }

    #[test]
    fn test_validation_skips_training_steps() {
        let log = EventLog::default();
        let mut learner = observed(&log);
        learner.fit(FitOptions::eval_only(1)).unwrap();

        assert_eq!(log.count("r:after_batch"), 2);
        assert_eq!(log.count("r:after_predict"), 2);
        assert_eq!(log.count("r:after_backward"), 0);
        assert_eq!(log.count("r:after_step"), 0);
        assert!(!learner.state().training());
    }

    #[test]
    fn test_fit_cancel_runs_cleanup_once() {
        let log = EventLog::default();
        let recorder = Recorder::observer("r", 0, &log)
            .raising_if(Hook::AfterBatch, |s| s.epoch == 1, Interrupt::cancel_fit);
        let mut learner = toy_learner().with_steps(TrainSteps).with_callback(recorder);

        let outcome = learner.fit(FitOptions::new(5)).unwrap();

        assert_eq!(outcome, ScopeOutcome::Cancelled(Scope::Fit));
        assert_eq!(log.count("r:cleanup_fit"), 1);
        assert_eq!(log.count("r:after_fit"), 0);
        assert_eq!(log.count("r:before_epoch"), 3);
    }

    #[test]
    fn test_skip_batch_policy_continues_epoch() {
        let log = EventLog::default();
        let recorder = Recorder::observer("r", 0, &log)
            .raising_if(Hook::BeforeBatch, |s| s.iteration == 1, Interrupt::cancel_batch);
        let mut learner = toy_learner_with(
            LearnerConfig::default().with_batch_cancel(BatchCancelPolicy::SkipBatch),
        )
        .with_steps(TrainSteps)
        .with_callback(recorder);

        learner.fit(FitOptions::new(1).with_valid(false)).unwrap();

        assert_eq!(log.count("r:before_batch"), 4);
        assert_eq!(log.count("r:cleanup_batch"), 4);
        assert_eq!(log.count("r:after_batch"), 3);
    }

    #[test]
    fn test_temporary_callbacks_removed_after_error() {
        let log = EventLog::default();
        let mut learner = toy_learner().with_steps(TrainSteps);

        let failing = Recorder::observer("tmp", 0, &log)
            .raising(Hook::AfterEpoch, || Error::NonFinite("loss").into());
        let result = learner.fit_with(FitOptions::new(2), vec![Box::new(failing)]);

        assert!(matches!(result, Err(Error::NonFinite("loss"))));
        assert!(learner.callbacks().is_empty());
        assert_eq!(log.count("tmp:cleanup_epoch"), 1);
        assert_eq!(log.count("tmp:cleanup_fit"), 1);
    }

    #[test]
    fn test_uncaught_cancel_is_an_error() {
        let log = EventLog::default();
        let mut learner = toy_learner().with_steps(TrainSteps);
        // A batch cancel raised outside any batch scope has nowhere to land
        let stray =
            Recorder::new("stray", 0, &log).raising(Hook::BeforeFit, Interrupt::cancel_batch);

        let result = learner.fit_with(FitOptions::new(1), vec![Box::new(stray)]);
        assert!(matches!(result, Err(Error::UncaughtCancel(Scope::Batch))));
    }

    #[test]
    fn test_invalid_options_rejected_before_hooks() {
        let log = EventLog::default();
        let mut learner = observed(&log);
        assert!(matches!(learner.fit(FitOptions::new(0)), Err(Error::Config(_))));
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_optimizer_recreated_with_override() {
        let mut learner = toy_learner().with_steps(TrainSteps);
        learner.fit(FitOptions::new(1).with_learning_rate(0.01)).unwrap();
        assert_eq!(learner.state().optimizer.as_ref().map(|o| o.lr()), Some(0.01));

        learner.fit(FitOptions::new(1)).unwrap();
        assert_eq!(learner.state().optimizer.as_ref().map(|o| o.lr()), Some(0.1));
    }
}
