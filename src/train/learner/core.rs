//! Learner construction and callback management

use super::steps::{NumericStep, NumericSteps};
use super::LearnerState;
use crate::data::DataLoaders;
use crate::error::{Error, Result};
use crate::nn::{Device, Model};
use crate::optim::{Optimizer, OptimizerFactory, SGD};
use crate::train::callback::{
    Callback, CallbackId, CallbackManager, DeviceCallback, Hook, HookResult,
};
use crate::train::{LearnerConfig, LossFn};

/// Training loop driven by callbacks
///
/// The learner sequences fit → epoch → batch and the numeric steps of each
/// batch. Everything else (device placement, metrics, progress, schedules,
/// early exits) is done by [`Callback`]s reading and writing the shared
/// [`LearnerState`].
///
/// # Example
///
/// ```
/// use aprendiz::data::DataLoaders;
/// use aprendiz::nn::Linear;
/// use aprendiz::train::{Batch, FitOptions, Learner, LearnerConfig, MSELoss, TrainCallback};
/// use ndarray::array;
///
/// let batches = vec![Batch::pair(array![[0.0], [1.0]], array![[1.0], [3.0]])];
/// let data = DataLoaders::new(batches.clone(), batches);
///
/// let mut learner = Learner::new(Linear::zeros(1, 1), data, MSELoss, LearnerConfig::default())
///     .unwrap()
///     .with_callback(TrainCallback::new());
/// learner.fit(FitOptions::new(3)).unwrap();
/// ```
pub struct Learner {
    pub(super) state: LearnerState,
    pub(super) callbacks: CallbackManager,
    pub(super) steps: Option<Box<dyn NumericSteps>>,
    pub(super) optimizer_factory: Option<OptimizerFactory>,
    pub(super) config: LearnerConfig,
}

impl Learner {
    /// Create a learner that uses SGD and takes its numeric steps from callbacks
    ///
    /// A non-CPU `config.device` registers a [`DeviceCallback`] for it.
    pub fn new(
        model: impl Model + 'static,
        data: DataLoaders,
        loss_fn: impl LossFn + 'static,
        config: LearnerConfig,
    ) -> Result<Self> {
        config.validate()?;
        let state = LearnerState::new(
            Box::new(model),
            Box::new(loss_fn),
            data,
            config.learning_rate,
            config.num_inputs,
        );
        let factory: OptimizerFactory =
            Box::new(|lr| -> Box<dyn Optimizer> { Box::new(SGD::new(lr, 0.0)) });
        let mut callbacks = CallbackManager::new();
        if config.device != Device::Cpu {
            callbacks.add(DeviceCallback::new(config.device));
        }
        Ok(Self {
            state,
            callbacks,
            steps: None,
            optimizer_factory: Some(factory),
            config,
        })
    }

    /// Use a numeric step provider
    pub fn with_steps(mut self, steps: impl NumericSteps + 'static) -> Self {
        self.steps = Some(Box::new(steps));
        self
    }

    /// Replace the optimizer factory
    pub fn with_optimizer<F>(mut self, factory: F) -> Self
    where
        F: Fn(f32) -> Box<dyn Optimizer> + 'static,
    {
        self.optimizer_factory = Some(Box::new(factory));
        self
    }

    /// Do not create an optimizer on `fit`
    pub fn without_optimizer(mut self) -> Self {
        self.optimizer_factory = None;
        self
    }

    /// Register a callback
    pub fn with_callback(mut self, callback: impl Callback + 'static) -> Self {
        self.callbacks.add(callback);
        self
    }

    /// Register a callback, returning its handle
    pub fn add_callback(&mut self, callback: impl Callback + 'static) -> CallbackId {
        self.callbacks.add(callback)
    }

    /// Unregister a callback
    pub fn remove_callback(&mut self, id: CallbackId) -> Option<Box<dyn Callback>> {
        self.callbacks.remove(id)
    }

    /// Construction parameters
    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    /// Registered callbacks
    pub fn callbacks(&self) -> &CallbackManager {
        &self.callbacks
    }

    /// Training state
    pub fn state(&self) -> &LearnerState {
        &self.state
    }

    /// Mutable training state
    pub fn state_mut(&mut self) -> &mut LearnerState {
        &mut self.state
    }

    /// Model under training
    pub fn model(&self) -> &dyn Model {
        self.state.model.as_ref()
    }

    /// Dispatch a hook to the registered callbacks
    pub fn dispatch(&mut self, hook: Hook) -> HookResult {
        self.callbacks.run(hook, &mut self.state)
    }

    /// Run a numeric step from the provider, or from the callbacks if the
    /// provider does not supply it
    pub(super) fn numeric_step(&mut self, step: NumericStep) -> HookResult {
        let hook = step.hook();
        if let Some(steps) = self.steps.as_mut() {
            if steps.supplies().contains(hook) {
                return step.run(steps.as_mut(), &mut self.state);
            }
        }
        if !self.callbacks.implements(hook) {
            return Err(Error::MissingStep(hook).into());
        }
        self.dispatch(hook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::Linear;
    use crate::train::learner::fixtures::{
        toy_data, toy_learner, toy_learner_with, EventLog, Recorder,
    };
    use crate::train::learner::steps::TrainSteps;
    use crate::train::{FitOptions, Interrupt, MSELoss};

    #[test]
    fn test_callback_registration() {
        let log = EventLog::default();
        let mut learner = toy_learner();
        let id = learner.add_callback(Recorder::new("r", 0, &log));
        assert_eq!(learner.callbacks().len(), 1);
        assert!(learner.remove_callback(id).is_some());
        assert!(learner.callbacks().is_empty());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = LearnerConfig::default().with_learning_rate(0.0);
        let result = Learner::new(Linear::zeros(1, 1), toy_data(), MSELoss, config);
        assert!(matches!(result, Err(Error::Config(_))));

        let config = LearnerConfig::default().with_num_inputs(0);
        let result = Learner::new(Linear::zeros(1, 1), toy_data(), MSELoss, config);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_configured_device_is_applied() {
        let config = LearnerConfig::default().with_device(Device::Cuda(0));
        let mut learner = toy_learner_with(config).with_steps(TrainSteps);
        assert_eq!(learner.callbacks().names(), vec!["DeviceCallback"]);

        learner.fit(FitOptions::new(1)).unwrap();
        assert_eq!(learner.model().device(), Device::Cuda(0));
    }

    #[test]
    fn test_cpu_device_adds_no_callback() {
        let learner = toy_learner();
        assert!(learner.callbacks().is_empty());
        assert_eq!(learner.config().device, Device::Cpu);
    }

    #[test]
    fn test_missing_numeric_step() {
        let mut learner = toy_learner();
        let result = learner.numeric_step(NumericStep::Predict);
        assert!(matches!(result, Err(Interrupt::Fail(Error::MissingStep(Hook::Predict)))));
    }

    #[test]
    fn test_numeric_step_falls_back_to_callbacks() {
        let log = EventLog::default();
        let mut learner =
            toy_learner().with_callback(Recorder::new("cb", 0, &log).on(&[Hook::Step]));
        learner.numeric_step(NumericStep::Step).unwrap();
        assert_eq!(log.events(), vec!["cb:step"]);
    }

    #[test]
    fn test_provider_takes_precedence() {
        let log = EventLog::default();
        let mut learner = toy_learner()
            .with_steps(TrainSteps)
            .with_callback(Recorder::new("cb", 0, &log).on(&[Hook::ZeroGrad]));
        learner.state_mut().optimizer = Some(Box::new(SGD::new(0.1, 0.0)));

        learner.numeric_step(NumericStep::ZeroGrad).unwrap();
        assert!(log.events().is_empty());
    }
}
