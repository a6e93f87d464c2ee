//! Cancellation signals and hook results

use super::hooks::Scope;
use crate::error::Error;

/// Non-local exit from a hook
///
/// `Cancel` unwinds to the boundary of its scope and is absorbed there;
/// `Fail` propagates through every enclosing scope up to the `fit` caller.
#[derive(Debug)]
pub enum Interrupt {
    /// Request to stop the given scope early
    Cancel(Scope),
    /// Unexpected failure
    Fail(Error),
}

impl Interrupt {
    /// Stop the remaining epochs of training
    pub fn cancel_fit() -> Self {
        Interrupt::Cancel(Scope::Fit)
    }

    /// Stop the remainder of the current epoch pass
    pub fn cancel_epoch() -> Self {
        Interrupt::Cancel(Scope::Epoch)
    }

    /// Stop the current batch
    pub fn cancel_batch() -> Self {
        Interrupt::Cancel(Scope::Batch)
    }

    /// Scope targeted by a cancellation, `None` for failures
    pub fn cancelled_scope(&self) -> Option<Scope> {
        match self {
            Interrupt::Cancel(scope) => Some(*scope),
            Interrupt::Fail(_) => None,
        }
    }

    /// Convert into an error, treating a stray cancellation as misuse
    pub fn into_error(self) -> Error {
        match self {
            Interrupt::Cancel(scope) => Error::UncaughtCancel(scope),
            Interrupt::Fail(err) => err,
        }
    }
}

impl From<Error> for Interrupt {
    fn from(err: Error) -> Self {
        Interrupt::Fail(err)
    }
}

impl From<std::io::Error> for Interrupt {
    fn from(err: std::io::Error) -> Self {
        Interrupt::Fail(Error::Io(err))
    }
}

/// Result of a hook invocation
pub type HookResult = std::result::Result<(), Interrupt>;
