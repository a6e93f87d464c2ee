//! Learner and fit configuration
//!
//! `LearnerConfig` can be written by hand with the `with_*` builders or
//! loaded from YAML:
//!
//! ```yaml
//! learning_rate: 0.05
//! num_inputs: 1
//! device: cpu
//! batch_cancel: end_epoch
//! bar_width: 30
//! ```

use crate::error::{Error, Result};
use crate::nn::Device;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What a batch cancellation does to the rest of the epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchCancelPolicy {
    /// Stop iterating the current epoch's batches
    #[default]
    EndEpoch,
    /// Continue with the next batch of the same epoch
    SkipBatch,
}

/// Learner construction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerConfig {
    /// Default learning rate used when `fit` gets no override
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
    /// Number of leading batch tensors fed to the model
    #[serde(default = "default_num_inputs")]
    pub num_inputs: usize,
    /// Target device
    #[serde(default)]
    pub device: Device,
    /// Batch cancellation policy
    #[serde(default)]
    pub batch_cancel: BatchCancelPolicy,
    /// Progress bar width in characters
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
}

fn default_learning_rate() -> f32 {
    0.1
}

fn default_num_inputs() -> usize {
    1
}

fn default_bar_width() -> usize {
    30
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            num_inputs: default_num_inputs(),
            device: Device::Cpu,
            batch_cancel: BatchCancelPolicy::EndEpoch,
            bar_width: default_bar_width(),
        }
    }
}

impl LearnerConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set default learning rate
    pub fn with_learning_rate(mut self, lr: f32) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Set number of model inputs per batch
    pub fn with_num_inputs(mut self, num_inputs: usize) -> Self {
        self.num_inputs = num_inputs;
        self
    }

    /// Set target device
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Set batch cancellation policy
    pub fn with_batch_cancel(mut self, policy: BatchCancelPolicy) -> Self {
        self.batch_cancel = policy;
        self
    }

    /// Set progress bar width
    pub fn with_bar_width(mut self, width: usize) -> Self {
        self.bar_width = width;
        self
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Check the configuration for invalid values
    pub fn validate(&self) -> Result<()> {
        validate_learning_rate(self.learning_rate)?;
        if self.num_inputs == 0 {
            return Err(Error::Config("num_inputs must be at least 1".into()));
        }
        Ok(())
    }
}

fn validate_learning_rate(lr: f32) -> Result<()> {
    if !lr.is_finite() || lr <= 0.0 {
        return Err(Error::Config(format!("learning rate must be positive and finite, got {lr}")));
    }
    Ok(())
}

/// Per-call options of `Learner::fit`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Number of epochs to run
    pub num_epochs: usize,
    /// Run a training pass each epoch
    #[serde(default = "default_true")]
    pub train: bool,
    /// Run a validation pass each epoch
    #[serde(default = "default_true")]
    pub valid: bool,
    /// Override of the learner's default learning rate
    #[serde(default)]
    pub learning_rate: Option<f32>,
}

fn default_true() -> bool {
    true
}

impl FitOptions {
    /// Train and validate for `num_epochs`
    pub fn new(num_epochs: usize) -> Self {
        Self {
            num_epochs,
            train: true,
            valid: true,
            learning_rate: None,
        }
    }

    /// Only run validation passes
    pub fn eval_only(num_epochs: usize) -> Self {
        Self::new(num_epochs).with_train(false)
    }

    /// Enable or disable training passes
    pub fn with_train(mut self, train: bool) -> Self {
        self.train = train;
        self
    }

    /// Enable or disable validation passes
    pub fn with_valid(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }

    /// Override the learning rate for this call
    pub fn with_learning_rate(mut self, lr: f32) -> Self {
        self.learning_rate = Some(lr);
        self
    }

    /// Check the options; a call that neither trains nor validates only warns
    pub fn validate(&self) -> Result<()> {
        if self.num_epochs == 0 {
            return Err(Error::Config("num_epochs must be positive".into()));
        }
        if let Some(lr) = self.learning_rate {
            validate_learning_rate(lr)?;
        }
        if !self.train && !self.valid {
            tracing::warn!("fit called with train and valid disabled; only fit hooks will run");
        }
        Ok(())
    }
}
