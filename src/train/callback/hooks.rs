//! Hook names, scopes and hook sets

use std::fmt;

/// A named lifecycle point at which callbacks are dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    BeforeFit,
    AfterFit,
    CleanupFit,
    BeforeEpoch,
    AfterEpoch,
    CleanupEpoch,
    BeforeBatch,
    AfterBatch,
    CleanupBatch,
    AfterPredict,
    AfterLoss,
    AfterBackward,
    AfterStep,
    Predict,
    CalculateLoss,
    Backward,
    Step,
    ZeroGrad,
}

impl Hook {
    /// Every hook, in declaration order
    pub const ALL: [Hook; 18] = [
        Hook::BeforeFit,
        Hook::AfterFit,
        Hook::CleanupFit,
        Hook::BeforeEpoch,
        Hook::AfterEpoch,
        Hook::CleanupEpoch,
        Hook::BeforeBatch,
        Hook::AfterBatch,
        Hook::CleanupBatch,
        Hook::AfterPredict,
        Hook::AfterLoss,
        Hook::AfterBackward,
        Hook::AfterStep,
        Hook::Predict,
        Hook::CalculateLoss,
        Hook::Backward,
        Hook::Step,
        Hook::ZeroGrad,
    ];

    /// Snake-case hook name
    pub fn name(self) -> &'static str {
        match self {
            Hook::BeforeFit => "before_fit",
            Hook::AfterFit => "after_fit",
            Hook::CleanupFit => "cleanup_fit",
            Hook::BeforeEpoch => "before_epoch",
            Hook::AfterEpoch => "after_epoch",
            Hook::CleanupEpoch => "cleanup_epoch",
            Hook::BeforeBatch => "before_batch",
            Hook::AfterBatch => "after_batch",
            Hook::CleanupBatch => "cleanup_batch",
            Hook::AfterPredict => "after_predict",
            Hook::AfterLoss => "after_loss",
            Hook::AfterBackward => "after_backward",
            Hook::AfterStep => "after_step",
            Hook::Predict => "predict",
            Hook::CalculateLoss => "calculate_loss",
            Hook::Backward => "backward",
            Hook::Step => "step",
            Hook::ZeroGrad => "zero_grad",
        }
    }

    /// Whether this hook performs numeric work rather than observing it
    pub fn is_numeric_step(self) -> bool {
        HookSet::NUMERIC_STEPS.contains(self)
    }

    const fn bit(self) -> u32 {
        1 << self as u32
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extent of a wrapped loop body; each scope has its own cancellation signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Fit,
    Epoch,
    Batch,
}

impl Scope {
    /// Hook dispatched before the scope body
    pub fn before(self) -> Hook {
        match self {
            Scope::Fit => Hook::BeforeFit,
            Scope::Epoch => Hook::BeforeEpoch,
            Scope::Batch => Hook::BeforeBatch,
        }
    }

    /// Hook dispatched after the scope body completes
    pub fn after(self) -> Hook {
        match self {
            Scope::Fit => Hook::AfterFit,
            Scope::Epoch => Hook::AfterEpoch,
            Scope::Batch => Hook::AfterBatch,
        }
    }

    /// Hook dispatched on every exit from the scope
    pub fn cleanup(self) -> Hook {
        match self {
            Scope::Fit => Hook::CleanupFit,
            Scope::Epoch => Hook::CleanupEpoch,
            Scope::Batch => Hook::CleanupBatch,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scope::Fit => "fit",
            Scope::Epoch => "epoch",
            Scope::Batch => "batch",
        })
    }
}

/// Set of hooks a callback implements
///
/// # Example
///
/// ```
/// use aprendiz::train::{Hook, HookSet};
///
/// let hooks = HookSet::of(&[Hook::BeforeFit, Hook::AfterBatch]);
/// assert!(hooks.contains(Hook::AfterBatch));
/// assert!(!hooks.contains(Hook::Predict));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct HookSet(u32);

impl HookSet {
    /// No hooks
    pub const EMPTY: HookSet = HookSet(0);

    /// The five numeric-step hooks
    pub const NUMERIC_STEPS: HookSet = HookSet::of(&[
        Hook::Predict,
        Hook::CalculateLoss,
        Hook::Backward,
        Hook::Step,
        Hook::ZeroGrad,
    ]);

    /// Build a set from a list of hooks
    pub const fn of(hooks: &[Hook]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < hooks.len() {
            bits |= hooks[i].bit();
            i += 1;
        }
        HookSet(bits)
    }

    /// Set with one more hook
    pub const fn with(self, hook: Hook) -> Self {
        HookSet(self.0 | hook.bit())
    }

    /// Union of two sets
    pub const fn union(self, other: HookSet) -> Self {
        HookSet(self.0 | other.0)
    }

    /// Check membership
    pub const fn contains(self, hook: Hook) -> bool {
        self.0 & hook.bit() != 0
    }

    /// Check if the set is empty
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of hooks in the set
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Hooks in declaration order
    pub fn iter(self) -> impl Iterator<Item = Hook> {
        Hook::ALL.into_iter().filter(move |hook| self.contains(*hook))
    }
}

impl fmt::Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(Hook::name)).finish()
    }
}

impl FromIterator<Hook> for HookSet {
    fn from_iter<I: IntoIterator<Item = Hook>>(iter: I) -> Self {
        iter.into_iter().fold(HookSet::EMPTY, HookSet::with)
    }
}

/// How a scope exited without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeOutcome {
    /// Body and `after_*` hook ran to completion
    Completed,
    /// The scope absorbed its own cancellation signal
    Cancelled(Scope),
}

impl ScopeOutcome {
    /// Check if the scope was cancelled
    pub fn is_cancelled(self) -> bool {
        matches!(self, ScopeOutcome::Cancelled(_))
    }
}
