//! Progress reporting and live loss curves

use super::{Callback, Hook, HookResult, HookSet, MetricsCallback, MetricsLogger, MetricsRecord};
use crate::data::Batches;
use crate::train::tui::{sparkline, ProgressBar};
use crate::train::{Batch, LearnerConfig, LearnerState};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Shared output writer
pub type SharedWriter = Rc<RefCell<dyn Write>>;

/// Loss curves buffered for plotting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LossHistory {
    /// Loss of every training batch
    pub batch_losses: Vec<f32>,
    /// Mean loss of every validation pass
    pub validation_losses: Vec<f32>,
    /// Training-batch count at which each validation loss was taken
    pub validation_steps: Vec<usize>,
}

/// Metrics logger that writes a table to the progress output
struct TableLogger {
    out: SharedWriter,
    header_written: bool,
}

impl MetricsLogger for TableLogger {
    fn log(&mut self, record: &MetricsRecord) -> crate::error::Result<()> {
        let mut out = self.out.borrow_mut();
        if !self.header_written {
            writeln!(out, "\n{}", record.columns().join("\t"))?;
            self.header_written = true;
        }
        writeln!(out, "{}", record.cells().join("\t"))?;
        Ok(())
    }
}

/// Batch iterator that advances a progress bar
struct Tracked {
    inner: Batches,
    bar: Rc<RefCell<ProgressBar>>,
    position: usize,
}

impl Iterator for Tracked {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        let batch = self.inner.next()?;
        self.bar.borrow_mut().update(self.position);
        self.position += 1;
        Some(batch)
    }
}

/// Draws a progress bar per pass and takes over the metrics log output
///
/// With plotting enabled it also records the training loss of every batch
/// and the validation loss of every pass, rendered as sparklines after each
/// validation pass. Runs right after [`MetricsCallback`] so the metrics
/// record of a pass is available in `after_epoch`.
pub struct ProgressCallback {
    plot: bool,
    width: usize,
    out: SharedWriter,
    bar: Option<Rc<RefCell<ProgressBar>>>,
    history: Rc<RefCell<LossHistory>>,
}

impl ProgressCallback {
    /// Write to stderr, no plotting
    pub fn new() -> Self {
        Self {
            plot: false,
            width: 30,
            out: Rc::new(RefCell::new(io::stderr())),
            bar: None,
            history: Rc::new(RefCell::new(LossHistory::default())),
        }
    }

    /// Write to stderr with the bar width of a learner configuration
    pub fn from_config(config: &LearnerConfig) -> Self {
        Self::new().with_width(config.bar_width)
    }

    /// Enable loss curve buffering and rendering
    pub fn with_plot(mut self, plot: bool) -> Self {
        self.plot = plot;
        self
    }

    /// Set bar width
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Write to a different output
    pub fn with_writer(mut self, out: SharedWriter) -> Self {
        self.out = out;
        self
    }

    /// Handle to the buffered loss curves
    pub fn history(&self) -> Rc<RefCell<LossHistory>> {
        Rc::clone(&self.history)
    }

    fn plot_line(&self) -> String {
        let history = self.history.borrow();
        format!(
            "train {} │ valid {}",
            sparkline(&history.batch_losses, self.width),
            sparkline(&history.validation_losses, self.width)
        )
    }
}

impl Default for ProgressCallback {
    fn default() -> Self {
        Self::new()
    }
}

impl Callback for ProgressCallback {
    fn name(&self) -> &'static str {
        "ProgressCallback"
    }

    fn order(&self) -> i32 {
        MetricsCallback::ORDER + 1
    }

    fn hooks(&self) -> HookSet {
        HookSet::of(&[
            Hook::BeforeFit,
            Hook::BeforeEpoch,
            Hook::AfterBatch,
            Hook::AfterEpoch,
            Hook::CleanupFit,
        ])
    }

    fn before_fit(&mut self, state: &mut LearnerState) -> HookResult {
        *self.history.borrow_mut() = LossHistory::default();
        if state.metrics.is_some() {
            state.metrics_logger = Some(Box::new(TableLogger {
                out: Rc::clone(&self.out),
                header_written: false,
            }));
        }
        Ok(())
    }

    fn before_epoch(&mut self, state: &mut LearnerState) -> HookResult {
        let bar = Rc::new(RefCell::new(ProgressBar::new(state.num_batches, self.width)));
        if let Some(inner) = state.batches.take() {
            state.batches = Some(Box::new(Tracked {
                inner,
                bar: Rc::clone(&bar),
                position: 0,
            }));
        }
        self.bar = Some(bar);
        Ok(())
    }

    fn after_batch(&mut self, state: &mut LearnerState) -> HookResult {
        let Some(bar) = &self.bar else {
            return Ok(());
        };
        let loss = state.loss.as_ref().map(|l| l.value);
        let line = {
            let mut bar = bar.borrow_mut();
            bar.update(state.iteration + 1);
            if let Some(loss) = loss {
                bar.set_comment(format!("loss {loss:.3}"));
            }
            bar.render()
        };
        write!(self.out.borrow_mut(), "\r{line}")?;

        if self.plot && state.metrics.is_some() && state.training() {
            if let Some(loss) = loss {
                self.history.borrow_mut().batch_losses.push(loss);
            }
        }
        Ok(())
    }

    fn after_epoch(&mut self, state: &mut LearnerState) -> HookResult {
        writeln!(self.out.borrow_mut())?;
        if !self.plot || state.training() {
            return Ok(());
        }
        if let Some(loss) = state.metrics.as_ref().and_then(MetricsRecord::loss) {
            let step = (state.epoch + 1) * state.data.train.len();
            let mut history = self.history.borrow_mut();
            history.validation_losses.push(loss);
            history.validation_steps.push(step);
        }
        let line = self.plot_line();
        writeln!(self.out.borrow_mut(), "{line}")?;
        Ok(())
    }

    fn cleanup_fit(&mut self, state: &mut LearnerState) -> HookResult {
        state.metrics_logger = None;
        self.bar = None;
        Ok(())
    }
}
