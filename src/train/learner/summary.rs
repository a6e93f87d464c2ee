//! Dry-run model summary

use super::{Learner, LearnerState};
use crate::error::{Error, Result};
use crate::train::callback::{Callback, Hook, HookResult, HookSet, SingleBatchCallback};
use crate::train::FitOptions;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shapes and size of a model, taken from one validation batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSummary {
    /// Model type name
    pub module: &'static str,
    /// Shape of each model input
    pub inputs: Vec<(usize, usize)>,
    /// Shape of the predictions
    pub output: (usize, usize),
    /// Trainable scalars
    pub num_params: usize,
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "|Module|Input|Output|Num params|")?;
        writeln!(f, "|--|--|--|--|")?;
        let inputs: Vec<String> = self.inputs.iter().map(|s| format!("{s:?}")).collect();
        writeln!(
            f,
            "|{}|{}|{:?}|{}|",
            self.module,
            inputs.join(", "),
            self.output,
            self.num_params
        )?;
        write!(f, "Total parameters: {}", self.num_params)
    }
}

/// Captures the summary in `after_predict`
struct SummaryCallback {
    summary: Rc<RefCell<Option<ModelSummary>>>,
}

impl Callback for SummaryCallback {
    fn name(&self) -> &'static str {
        "SummaryCallback"
    }

    fn hooks(&self) -> HookSet {
        HookSet::of(&[Hook::AfterPredict])
    }

    fn after_predict(&mut self, state: &mut LearnerState) -> HookResult {
        let inputs = state
            .batch()?
            .inputs(state.num_inputs)
            .iter()
            .map(|t| t.dim())
            .collect();
        let output = state.predictions()?.dim();
        let summary = ModelSummary {
            module: state.model.name(),
            inputs,
            output,
            num_params: state.model.num_parameters(),
        };
        *self.summary.borrow_mut() = Some(summary);
        Ok(())
    }
}

impl Learner {
    /// Run one validation batch and report the model's shapes and size
    ///
    /// Leaves the model in evaluation mode.
    pub fn summary(&mut self) -> Result<ModelSummary> {
        let summary = Rc::new(RefCell::new(None));
        let capture = SummaryCallback {
            summary: Rc::clone(&summary),
        };
        self.fit_with(
            FitOptions::eval_only(1),
            vec![Box::new(capture), Box::new(SingleBatchCallback)],
        )?;
        let result = summary.borrow_mut().take();
        let summary = result.ok_or(Error::MissingState("validation batch"))?;
        tracing::info!(module = summary.module, params = summary.num_params, "model summary");
        Ok(summary)
    }
}
