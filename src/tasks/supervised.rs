//! # A spawned, supervised unit of work.
//!
//! ## Rules
//! - Each task gets a **child token** of the supervisor's token.
//! - `cancel` never aborts: it cancels the token and waits for the task to
//!   acknowledge, warning every `grace` while it waits (`None` waits silently).
//! - A panic is reported as [`TaskOutcome::Panicked`] (and to observers) at join time.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn, Instrument};

use super::instrument::Instrumented;
use super::{AsOutcome, TaskOutcome, TaskReport, TaskRole};
use crate::observers::{ObserverSet, SpawnInfo};

/// A running task owned by the supervisor.
pub(crate) struct SupervisedTask<T> {
    name: Arc<str>,
    role: TaskRole,
    token: CancellationToken,
    join: JoinHandle<T>,
    observers: Arc<ObserverSet>,
}

impl<T> SupervisedTask<T>
where
    T: AsOutcome + Send + 'static,
{
    /// Spawns `make(child_token)` on the runtime, instrumented for `observers`.
    pub(crate) fn spawn<F, Fut>(
        name: &str,
        role: TaskRole,
        parent: &CancellationToken,
        observers: Arc<ObserverSet>,
        make: F,
    ) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let name: Arc<str> = Arc::from(name);
        let token = parent.child_token();
        let span = tracing::debug_span!("task", name = %name);

        let fut = Instrumented::new(
            Arc::clone(&name),
            make(token.clone()).instrument(span).boxed(),
            Arc::clone(&observers),
        );
        observers.spawned(&SpawnInfo::new(Arc::clone(&name), role));
        debug!(task = %name, ?role, "spawned");

        Self {
            name,
            role,
            join: tokio::spawn(fut),
            token,
            observers,
        }
    }

    /// Task name.
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Requests cancellation and waits for the acknowledgement.
    ///
    /// `grace` only controls how often a slow acknowledgement is logged
    /// (`None` = never); the task is never force-killed.
    pub(crate) async fn cancel(mut self, grace: Option<Duration>) -> Result<T, TaskOutcome> {
        debug!(task = %self.name, "cancelling");
        self.token.cancel();
        self.wait(grace).await
    }

    /// [`cancel`](Self::cancel), summarized as a report.
    pub(crate) async fn cancel_and_report(self, grace: Option<Duration>) -> TaskReport {
        let name = self.name.to_string();
        let role = self.role;
        let outcome = match self.cancel(grace).await {
            Ok(value) => value.as_outcome(),
            Err(outcome) => outcome,
        };
        debug!(task = %name, outcome = %outcome, "task ended");
        TaskReport { name, role, outcome }
    }

    /// Waits for the task to end on its own; once `stop` is cancelled, cancels
    /// the task and keeps waiting for its acknowledgement.
    pub(crate) async fn join_until(
        mut self,
        stop: &CancellationToken,
        grace: Option<Duration>,
    ) -> Result<T, TaskOutcome> {
        let early = tokio::select! {
            biased;
            res = &mut self.join => Some(res),
            _ = stop.cancelled() => None,
        };
        match early {
            Some(res) => self.settle(res),
            None => self.cancel(grace).await,
        }
    }

    async fn wait(&mut self, grace: Option<Duration>) -> Result<T, TaskOutcome> {
        let joined = if let Some(grace) = grace {
            let mut waited = Duration::ZERO;
            loop {
                match tokio::time::timeout(grace, &mut self.join).await {
                    Ok(res) => break res,
                    Err(_elapsed) => {
                        waited += grace;
                        warn!(
                            task = %self.name,
                            waited_ms = waited.as_millis() as u64,
                            "task has not acknowledged cancellation yet"
                        );
                    }
                }
            }
        } else {
            (&mut self.join).await
        };

        self.settle(joined)
    }

    fn settle(&self, joined: Result<T, JoinError>) -> Result<T, TaskOutcome> {
        joined.map_err(|e| {
            let outcome = TaskOutcome::Panicked(e.to_string());
            self.observers.completed(&self.name, &outcome);
            outcome
        })
    }
}
