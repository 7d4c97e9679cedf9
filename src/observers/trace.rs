//! # Scheduler trace.
//!
//! Emits one `trace!` line each time a task is resumed or suspended:
//! ```text
//! TRACE missionvisor::observers::trace: ▶ resumed task="heartbeat"
//! TRACE missionvisor::observers::trace: ⏸ suspended task="heartbeat"
//! ```
//! Spawn is not logged to keep the volume down.

use std::collections::HashSet;

use tracing::trace;

use super::Observer;
use crate::tasks::TaskOutcome;

/// Trace-level scheduling log, with a set of hidden task names.
#[derive(Debug, Default)]
pub struct TraceObserver {
    hidden: HashSet<String>,
}

impl TraceObserver {
    /// Traces every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Never traces the given task.
    #[must_use]
    pub fn hide(mut self, task: impl Into<String>) -> Self {
        self.hidden.insert(task.into());
        self
    }

    fn visible(&self, task: &str) -> bool {
        !self.hidden.contains(task)
    }
}

impl Observer for TraceObserver {
    fn on_resume(&self, task: &str) {
        if self.visible(task) {
            trace!(task, "▶ resumed");
        }
    }

    fn on_suspend(&self, task: &str) {
        if self.visible(task) {
            trace!(task, "⏸ suspended");
        }
    }

    fn on_complete(&self, task: &str, outcome: &TaskOutcome) {
        if self.visible(task) {
            trace!(task, outcome = outcome.as_label(), "⏹ terminated");
        }
    }

    fn name(&self) -> &'static str {
        "TraceObserver"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn hidden_tasks_stay_out_of_the_trace() {
        let obs = TraceObserver::new().hide("heartbeat");
        for task in ["heartbeat", "connector"] {
            obs.on_resume(task);
            obs.on_suspend(task);
            obs.on_complete(task, &TaskOutcome::Cancelled);
        }

        assert!(logs_contain("connector"));
        assert!(logs_contain("resumed"));
        assert!(logs_contain("terminated"));
        assert!(!logs_contain("heartbeat"));
    }
}
