//! # Terminal report returned by `Supervisor::start`.

use std::fmt;

use crate::tasks::TaskReport;

/// Why the run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerminalOutcome {
    /// `max_run` elapsed.
    Timeout,
    /// A shutdown was requested.
    Cancelled,
}

impl TerminalOutcome {
    /// Returns a short stable label: `"timeout"` or `"cancelled"`.
    pub fn as_label(&self) -> &'static str {
        match self {
            TerminalOutcome::Timeout => "timeout",
            TerminalOutcome::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TerminalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// How the run ended, plus the final outcome of every task it spawned.
///
/// `tasks` lists the connector first, then background tasks in the order
/// they were cancelled (newest first).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerminalReport {
    /// Timeout or cancellation.
    pub outcome: TerminalOutcome,
    /// One entry per spawned task.
    pub tasks: Vec<TaskReport>,
}

impl TerminalReport {
    /// Looks up a task by name.
    pub fn task(&self, name: &str) -> Option<&TaskReport> {
        self.tasks.iter().find(|t| t.name == name)
    }
}
