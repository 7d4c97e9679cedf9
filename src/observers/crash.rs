use tracing::error;

use super::Observer;
use crate::tasks::TaskOutcome;

/// Logs tasks that ended in failure or panic.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrashObserver;

impl Observer for CrashObserver {
    fn on_complete(&self, task: &str, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::Failed(reason) => error!(task, reason = %reason, "task crashed"),
            TaskOutcome::Panicked(reason) => error!(task, reason = %reason, "task panicked"),
            TaskOutcome::Completed | TaskOutcome::Cancelled => {}
        }
    }

    fn name(&self) -> &'static str {
        "CrashObserver"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn only_failures_are_logged() {
        let obs = CrashObserver;
        obs.on_complete("listener", &TaskOutcome::Cancelled);
        obs.on_complete("heartbeat", &TaskOutcome::Failed("stream closed".into()));

        assert!(logs_contain("task crashed"));
        assert!(logs_contain("stream closed"));
        assert!(!logs_contain("listener"));
    }
}
