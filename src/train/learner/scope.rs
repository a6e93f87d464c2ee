//! Scoped hook dispatch around a loop body

use super::Learner;
use crate::train::callback::{HookResult, Interrupt, Scope, ScopeOutcome};

impl Learner {
    /// Run `body` between the `before_*`/`after_*` hooks of `scope`
    ///
    /// A cancellation of `scope` raised by the hooks or the body is absorbed
    /// and reported as [`ScopeOutcome::Cancelled`]. Cancellations of other
    /// scopes and failures propagate. `cleanup_*` is dispatched on every exit;
    /// if both the body and the cleanup fail, the body's failure is returned.
    pub fn with_scope<F>(&mut self, scope: Scope, body: F) -> Result<ScopeOutcome, Interrupt>
    where
        F: FnOnce(&mut Self) -> HookResult,
    {
        tracing::debug!(
            %scope,
            epoch = self.state.epoch,
            iteration = self.state.iteration,
            "enter"
        );
        let result = self
            .dispatch(scope.before())
            .and_then(|()| body(self))
            .and_then(|()| self.dispatch(scope.after()));

        let outcome = match result {
            Ok(()) => Ok(ScopeOutcome::Completed),
            Err(Interrupt::Cancel(cancelled)) if cancelled == scope => {
                tracing::debug!(%scope, "cancelled");
                Ok(ScopeOutcome::Cancelled(scope))
            }
            Err(interrupt) => Err(interrupt),
        };

        let cleanup = self.dispatch(scope.cleanup());
        match (outcome, cleanup) {
            (Err(interrupt), Err(secondary)) => {
                tracing::warn!(%scope, ?secondary, "cleanup failed while unwinding");
                Err(interrupt)
            }
            (Err(interrupt), Ok(())) => Err(interrupt),
            (Ok(_), Err(interrupt)) => Err(interrupt),
            (Ok(outcome), Ok(())) => Ok(outcome),
        }
    }
}
