//! Error types for the training loop

use crate::train::callback::{Hook, Scope};
use thiserror::Error;

/// Errors surfaced by `aprendiz`
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("No numeric step provider or callback supplies `{0}`")]
    MissingStep(Hook),

    #[error("Learner state `{0}` is not available at this point of the loop")]
    MissingState(&'static str),

    #[error("{0} cancellation escaped its scope")]
    UncaughtCancel(Scope),

    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for fallible training operations
pub type Result<T> = std::result::Result<T, Error>;
