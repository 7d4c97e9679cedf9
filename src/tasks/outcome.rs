use std::fmt;

use crate::error::TaskError;

/// How the supervisor treats a spawned unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskRole {
    /// Left running; cancelled at teardown.
    Background,
    /// Awaited by the supervisor for its result.
    AwaitedLeaf,
}

/// Terminal state of a supervised task.
///
/// `Cancelled` is distinct from both `Completed` and `Failed`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The task returned successfully.
    Completed,
    /// The task observed cancellation and acknowledged it.
    Cancelled,
    /// The task returned an error.
    Failed(String),
    /// The task panicked.
    Panicked(String),
}

impl TaskOutcome {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskOutcome::Completed => "completed",
            TaskOutcome::Cancelled => "cancelled",
            TaskOutcome::Failed(_) => "failed",
            TaskOutcome::Panicked(_) => "panicked",
        }
    }

    /// True for `Completed` and `Cancelled`: the task ended the way it was asked to.
    pub fn is_clean(&self) -> bool {
        matches!(self, TaskOutcome::Completed | TaskOutcome::Cancelled)
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutcome::Failed(reason) | TaskOutcome::Panicked(reason) => {
                write!(f, "{}: {reason}", self.as_label())
            }
            _ => f.write_str(self.as_label()),
        }
    }
}

/// Classifies a task's return value.
pub trait AsOutcome {
    /// The outcome this value represents.
    fn as_outcome(&self) -> TaskOutcome;
}

impl<T> AsOutcome for Result<T, TaskError> {
    fn as_outcome(&self) -> TaskOutcome {
        match self {
            Ok(_) => TaskOutcome::Completed,
            Err(TaskError::Canceled) => TaskOutcome::Cancelled,
            Err(e) => TaskOutcome::Failed(e.to_string()),
        }
    }
}

/// Final record for one task, part of the supervisor's terminal report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskReport {
    /// Task name.
    pub name: String,
    /// Role it was spawned with.
    pub role: TaskRole,
    /// How it ended.
    pub outcome: TaskOutcome,
}
