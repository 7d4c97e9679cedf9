//! # TaskSet: the supervisor's background units.
//!
//! ## Rules
//! - Tasks are kept in spawn order.
//! - `cancel_all` cancels in **reverse** spawn order, one at a time, awaiting
//!   each acknowledgement before moving on.
//! - After `cancel_all` the set is empty; it never leaks a running task.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::{SupervisedTask, TaskReport, TaskRole};
use crate::error::TaskError;
use crate::observers::ObserverSet;

type Unit = Result<(), TaskError>;

pub(crate) struct TaskSet {
    tasks: Vec<SupervisedTask<Unit>>,
    parent: CancellationToken,
    observers: Arc<ObserverSet>,
}

impl TaskSet {
    pub(crate) fn new(parent: CancellationToken, observers: Arc<ObserverSet>) -> Self {
        Self {
            tasks: Vec::new(),
            parent,
            observers,
        }
    }

    /// Spawns a background unit.
    pub(crate) fn spawn<F, Fut>(&mut self, name: &str, make: F)
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Unit> + Send + 'static,
    {
        let task = SupervisedTask::spawn(
            name,
            TaskRole::Background,
            &self.parent,
            Arc::clone(&self.observers),
            make,
        );
        self.tasks.push(task);
    }

    /// Spawns a leaf the caller awaits itself; it is not kept in the set.
    pub(crate) fn spawn_leaf<T, F, Fut>(
        &self,
        name: &str,
        make: F,
    ) -> SupervisedTask<Result<T, TaskError>>
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        SupervisedTask::spawn(
            name,
            TaskRole::AwaitedLeaf,
            &self.parent,
            Arc::clone(&self.observers),
            make,
        )
    }

    /// Names in spawn order.
    pub(crate) fn names(&self) -> Vec<String> {
        self.tasks.iter().map(|t| t.name().to_string()).collect()
    }

    /// Cancels and joins every task, newest first.
    pub(crate) async fn cancel_all(&mut self, grace: Option<Duration>) -> Vec<TaskReport> {
        let mut reports = Vec::with_capacity(self.tasks.len());
        while let Some(task) = self.tasks.pop() {
            reports.push(task.cancel_and_report(grace).await);
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observers::Observer;
    use crate::tasks::TaskOutcome;
    use crate::testkit::RecordingObserver;

    #[tokio::test]
    async fn cancels_in_reverse_spawn_order() {
        let rec = Arc::new(RecordingObserver::default());
        let shared: Arc<dyn Observer> = rec.clone();
        let mut set = TaskSet::new(CancellationToken::new(), Arc::new(ObserverSet::new(vec![shared])));
        for name in ["first", "second", "third"] {
            set.spawn(name, |token| async move {
                token.cancelled().await;
                Err(TaskError::Canceled)
            });
        }
        assert_eq!(set.names(), vec!["first", "second", "third"]);

        let reports = set.cancel_all(None).await;
        let order: Vec<&str> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, vec!["third", "second", "first"]);
        assert!(reports.iter().all(|r| r.outcome == TaskOutcome::Cancelled));
        assert!(set.names().is_empty());
        assert_eq!(rec.completed().len(), 3);
    }

    #[tokio::test]
    async fn already_finished_task_reports_its_own_outcome() {
        let mut set = TaskSet::new(CancellationToken::new(), Arc::new(ObserverSet::default()));
        set.spawn("short", |_| async { Ok(()) });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let reports = set.cancel_all(None).await;
        assert_eq!(reports[0].outcome, TaskOutcome::Completed);
    }
}
