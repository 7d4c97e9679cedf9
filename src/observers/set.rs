//! # ObserverSet: fan-out over multiple observers.
//!
//! Calls each observer in registration order. A panic inside one observer is
//! caught and logged, and the remaining observers still run.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use super::{Observer, SpawnInfo};
use crate::tasks::TaskOutcome;

/// Ordered collection of observers.
#[derive(Clone, Default)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn Observer>>,
}

impl ObserverSet {
    /// Creates a set from the given observers.
    #[must_use]
    pub fn new(observers: Vec<Arc<dyn Observer>>) -> Self {
        Self { observers }
    }

    /// Adds one observer at the end.
    pub fn push(&mut self, observer: Arc<dyn Observer>) {
        self.observers.push(observer);
    }

    /// True if there are no observers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Number of observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn spawned(&self, info: &SpawnInfo) {
        self.each(|o| o.on_spawn(info));
    }

    pub(crate) fn resumed(&self, task: &str) {
        self.each(|o| o.on_resume(task));
    }

    pub(crate) fn suspended(&self, task: &str) {
        self.each(|o| o.on_suspend(task));
    }

    pub(crate) fn completed(&self, task: &str, outcome: &TaskOutcome) {
        self.each(|o| o.on_complete(task, outcome));
    }

    fn each(&self, f: impl Fn(&dyn Observer)) {
        for observer in &self.observers {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| f(observer.as_ref()))) {
                tracing::error!(
                    observer = observer.name(),
                    info = ?panic,
                    "observer panicked"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskRole;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Panicky;
    impl Observer for Panicky {
        fn on_spawn(&self, _info: &SpawnInfo) {
            panic!("boom");
        }
    }

    #[derive(Default)]
    struct Count(AtomicUsize);
    impl Observer for Count {
        fn on_spawn(&self, _info: &SpawnInfo) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn panicking_observer_is_isolated() {
        let count = Arc::new(Count::default());
        let set = ObserverSet::new(vec![Arc::new(Panicky), count.clone()]);

        set.spawned(&SpawnInfo::new("t".into(), TaskRole::Background));
        assert_eq!(count.0.load(Ordering::SeqCst), 1);
        assert_eq!(set.len(), 2);
    }
}
