//! Shared test helpers: a toy regression problem and a recording callback

use super::{Learner, LearnerState};
use crate::data::DataLoaders;
use crate::nn::Linear;
use crate::train::callback::{Callback, Hook, HookResult, HookSet, Interrupt};
use crate::train::{Batch, LearnerConfig, MSELoss};
use crate::Tensor;
use std::cell::RefCell;
use std::rc::Rc;

/// `count` batches of `rows` samples of y = 2x + 1, x in [0, 1)
pub fn line_batches(count: usize, rows: usize) -> Vec<Batch> {
    let total = (count * rows) as f32;
    (0..count)
        .map(|b| {
            let x = Tensor::from_shape_fn((rows, 1), |(r, _)| (b * rows + r) as f32 / total);
            let y = x.mapv(|v| 2.0 * v + 1.0);
            Batch::pair(x, y)
        })
        .collect()
}

/// Four training and two validation batches of two rows each
pub fn toy_data() -> DataLoaders {
    DataLoaders::new(line_batches(4, 2), line_batches(2, 2))
}

pub fn toy_state() -> LearnerState {
    LearnerState::new(Box::new(Linear::zeros(1, 1)), Box::new(MSELoss), toy_data(), 0.1, 1)
}

pub fn toy_learner() -> Learner {
    toy_learner_with(LearnerConfig::default())
}

/// Shared, clonable list of `label:hook` events
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: String) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.0.borrow().iter().filter(|e| *e == event).count()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

type Condition = Box<dyn Fn(&LearnerState) -> bool>;
type Raise = Box<dyn Fn() -> Interrupt>;

/// Callback that logs every declared hook and optionally interrupts
pub struct Recorder {
    label: String,
    order: i32,
    hooks: HookSet,
    log: EventLog,
    raises: Vec<(Hook, Condition, Raise)>,
}

impl Recorder {
    pub fn new(label: &str, order: i32, log: &EventLog) -> Self {
        Self {
            label: label.to_string(),
            order,
            hooks: HookSet::EMPTY,
            log: log.clone(),
            raises: Vec::new(),
        }
    }

    /// Record every hook except the numeric steps
    pub fn observer(label: &str, order: i32, log: &EventLog) -> Self {
        let hooks = Hook::ALL.into_iter().filter(|h| !h.is_numeric_step()).collect();
        Self {
            hooks,
            ..Self::new(label, order, log)
        }
    }

    pub fn on(mut self, hooks: &[Hook]) -> Self {
        self.hooks = self.hooks.union(HookSet::of(hooks));
        self
    }

    pub fn raising(self, hook: Hook, raise: impl Fn() -> Interrupt + 'static) -> Self {
        self.raising_if(hook, |_| true, raise)
    }

    pub fn raising_if(
        mut self,
        hook: Hook,
        condition: impl Fn(&LearnerState) -> bool + 'static,
        raise: impl Fn() -> Interrupt + 'static,
    ) -> Self {
        self.hooks = self.hooks.with(hook);
        self.raises.push((hook, Box::new(condition), Box::new(raise)));
        self
    }

    fn record(&mut self, hook: Hook, state: &mut LearnerState) -> HookResult {
        self.log.push(format!("{}:{}", self.label, hook));
        for (target, condition, raise) in &self.raises {
            if *target == hook && condition(state) {
                return Err(raise());
            }
        }
        Ok(())
    }
}

macro_rules! record_hooks {
    ($($method:ident => $hook:ident),* $(,)?) => {
        $(
            fn $method(&mut self, state: &mut LearnerState) -> HookResult {
                self.record(Hook::$hook, state)
            }
        )*
    };
}

impl Callback for Recorder {
    fn name(&self) -> &'static str {
        "Recorder"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn hooks(&self) -> HookSet {
        self.hooks
    }

    record_hooks! {
        before_fit => BeforeFit,
        after_fit => AfterFit,
        cleanup_fit => CleanupFit,
        before_epoch => BeforeEpoch,
        after_epoch => AfterEpoch,
        cleanup_epoch => CleanupEpoch,
        before_batch => BeforeBatch,
        after_batch => AfterBatch,
        cleanup_batch => CleanupBatch,
        after_predict => AfterPredict,
        after_loss => AfterLoss,
        after_backward => AfterBackward,
        after_step => AfterStep,
        predict => Predict,
        calculate_loss => CalculateLoss,
        backward => Backward,
        step => Step,
        zero_grad => ZeroGrad,
    }
}

pub fn toy_learner_with(config: LearnerConfig) -> Learner {
    Learner::new(Linear::zeros(1, 1), toy_data(), MSELoss, config).unwrap()
}
