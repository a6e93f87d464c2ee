//! Ordered dispatch of hooks to registered callbacks

use super::hooks::{Hook, HookSet};
use super::signal::HookResult;
use super::traits::{invoke, Callback};
use crate::train::LearnerState;

/// Handle for removing a registered callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

/// Invoke `hook` on every callback that implements it
///
/// Callbacks run in ascending [`Callback::order`]; the sort is stable, so
/// ties keep their slice order. The first interrupt stops the dispatch and
/// is returned to the caller.
pub fn run_callbacks(
    callbacks: &mut [Box<dyn Callback>],
    hook: Hook,
    state: &mut LearnerState,
) -> HookResult {
    let mut order: Vec<usize> = (0..callbacks.len()).collect();
    order.sort_by_key(|&i| callbacks[i].order());

    for i in order {
        let callback = callbacks[i].as_mut();
        if !callback.hooks().contains(hook) {
            continue;
        }
        tracing::trace!(callback = callback.name(), %hook, "dispatch");
        invoke(callback, hook, state)?;
    }
    Ok(())
}

/// Manages multiple callbacks and dispatches hooks to them
#[derive(Default)]
pub struct CallbackManager {
    callbacks: Vec<Box<dyn Callback>>,
    ids: Vec<CallbackId>,
    next_id: u64,
}

impl CallbackManager {
    /// Create new callback manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a callback
    pub fn add<C: Callback + 'static>(&mut self, callback: C) -> CallbackId {
        self.add_boxed(Box::new(callback))
    }

    /// Add an already boxed callback
    pub fn add_boxed(&mut self, callback: Box<dyn Callback>) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        self.callbacks.push(callback);
        self.ids.push(id);
        id
    }

    /// Remove a callback, returning it if it was registered
    pub fn remove(&mut self, id: CallbackId) -> Option<Box<dyn Callback>> {
        let index = self.ids.iter().position(|&other| other == id)?;
        self.ids.remove(index);
        Some(self.callbacks.remove(index))
    }

    /// Check if a callback is registered
    pub fn contains(&self, id: CallbackId) -> bool {
        self.ids.contains(&id)
    }

    /// Check if no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Get number of callbacks
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Callback names in dispatch order
    pub fn names(&self) -> Vec<&'static str> {
        let mut order: Vec<usize> = (0..self.callbacks.len()).collect();
        order.sort_by_key(|&i| self.callbacks[i].order());
        order.into_iter().map(|i| self.callbacks[i].name()).collect()
    }

    /// Union of the hooks of all registered callbacks
    pub fn hooks(&self) -> HookSet {
        self.callbacks.iter().fold(HookSet::EMPTY, |set, cb| set.union(cb.hooks()))
    }

    /// Check if any registered callback implements `hook`
    pub fn implements(&self, hook: Hook) -> bool {
        self.callbacks.iter().any(|cb| cb.hooks().contains(hook))
    }

    /// Dispatch a hook
    pub fn run(&mut self, hook: Hook, state: &mut LearnerState) -> HookResult {
        run_callbacks(&mut self.callbacks, hook, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::train::learner::fixtures::{toy_state, EventLog, Recorder};
    use crate::train::Interrupt;

    #[test]
    fn test_dispatch_order_is_stable() {
        let log = EventLog::default();
        let mut manager = CallbackManager::new();
        manager.add(Recorder::new("late", 5, &log).on(&[Hook::BeforeFit]));
        manager.add(Recorder::new("a", 0, &log).on(&[Hook::BeforeFit]));
        manager.add(Recorder::new("early", -1, &log).on(&[Hook::BeforeFit]));
        manager.add(Recorder::new("b", 0, &log).on(&[Hook::BeforeFit]));

        let mut state = toy_state();
        manager.run(Hook::BeforeFit, &mut state).unwrap();

        assert_eq!(
            log.events(),
            vec!["early:before_fit", "a:before_fit", "b:before_fit", "late:before_fit"]
        );
        assert_eq!(manager.names(), vec!["Recorder"; 4]);
    }

    #[test]
    fn test_missing_hook_is_skipped() {
        let log = EventLog::default();
        let mut manager = CallbackManager::new();
        manager.add(Recorder::new("fit", 0, &log).on(&[Hook::BeforeFit]));
        manager.add(Recorder::new("batch", 0, &log).on(&[Hook::AfterBatch]));

        let mut state = toy_state();
        manager.run(Hook::AfterBatch, &mut state).unwrap();
        manager.run(Hook::AfterStep, &mut state).unwrap();

        assert_eq!(log.events(), vec!["batch:after_batch"]);
        assert!(manager.implements(Hook::BeforeFit));
        assert!(!manager.implements(Hook::Predict));
        assert_eq!(manager.hooks().len(), 2);
    }

    #[test]
    fn test_first_interrupt_stops_dispatch() {
        let log = EventLog::default();
        let mut manager = CallbackManager::new();
        manager.add(
            Recorder::new("stopper", 0, &log)
                .on(&[Hook::AfterBatch])
                .raising(Hook::AfterBatch, Interrupt::cancel_epoch),
        );
        manager.add(Recorder::new("never", 1, &log).on(&[Hook::AfterBatch]));

        let mut state = toy_state();
        let result = manager.run(Hook::AfterBatch, &mut state);

        assert!(matches!(result, Err(Interrupt::Cancel(crate::train::Scope::Epoch))));
        assert_eq!(log.events(), vec!["stopper:after_batch"]);
    }

    #[test]
    fn test_failure_propagates() {
        let log = EventLog::default();
        let mut manager = CallbackManager::new();
        manager.add(
            Recorder::new("broken", 0, &log)
                .on(&[Hook::BeforeFit])
                .raising(Hook::BeforeFit, || Error::NonFinite("loss").into()),
        );

        let mut state = toy_state();
        let result = manager.run(Hook::BeforeFit, &mut state);
        assert!(matches!(result, Err(Interrupt::Fail(Error::NonFinite("loss")))));
    }

    #[test]
    fn test_add_remove() {
        let log = EventLog::default();
        let mut manager = CallbackManager::new();
        assert!(manager.is_empty());

        let first = manager.add(Recorder::new("first", 0, &log));
        let second = manager.add(Recorder::new("second", 0, &log));
        assert_eq!(manager.len(), 2);
        assert_ne!(first, second);

        assert!(manager.remove(first).is_some());
        assert!(manager.remove(first).is_none());
        assert!(!manager.contains(first));
        assert!(manager.contains(second));
        assert_eq!(manager.len(), 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn dispatch_is_sorted_and_stable(orders in proptest::collection::vec(-3i32..3, 0..12)) {
                let log = EventLog::default();
                let mut manager = CallbackManager::new();
                for (i, order) in orders.iter().enumerate() {
                    manager.add(Recorder::new(&i.to_string(), *order, &log).on(&[Hook::AfterLoss]));
                }

                let mut state = toy_state();
                manager.run(Hook::AfterLoss, &mut state).unwrap();

                let seen: Vec<usize> = log
                    .events()
                    .iter()
                    .map(|e| e.split(':').next().unwrap().parse().unwrap())
                    .collect();
                let mut expected: Vec<usize> = (0..orders.len()).collect();
                expected.sort_by_key(|&i| orders[i]);
                prop_assert_eq!(seen, expected);
            }
        }
    }
}
