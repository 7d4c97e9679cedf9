//! # Observer trait.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::tasks::{TaskOutcome, TaskRole};

/// Global spawn counter; gives every spawned task a unique increasing id.
static SPAWN_SEQ: AtomicU64 = AtomicU64::new(0);

/// Identity of a task at spawn time.
#[derive(Clone, Debug)]
pub struct SpawnInfo {
    /// Unique, monotonically increasing spawn sequence number.
    pub seq: u64,
    /// Task name.
    pub name: Arc<str>,
    /// Whether the supervisor awaits it or leaves it running.
    pub role: TaskRole,
    /// When it was spawned.
    pub at: Instant,
}

impl SpawnInfo {
    pub(crate) fn new(name: Arc<str>, role: TaskRole) -> Self {
        Self {
            seq: SPAWN_SEQ.fetch_add(1, Ordering::Relaxed),
            name,
            role,
            at: Instant::now(),
        }
    }
}

/// Scheduling callbacks for supervised tasks. All methods default to no-ops.
///
/// ```
/// use missionvisor::{Observer, SpawnInfo, TaskOutcome};
///
/// struct Count(std::sync::atomic::AtomicUsize);
///
/// impl Observer for Count {
///     fn on_spawn(&self, _info: &SpawnInfo) {
///         self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
///     }
/// }
/// ```
pub trait Observer: Send + Sync + 'static {
    /// A task was spawned.
    fn on_spawn(&self, _info: &SpawnInfo) {}

    /// A task is about to be polled.
    fn on_resume(&self, _task: &str) {}

    /// A poll returned `Pending`; the task yielded.
    fn on_suspend(&self, _task: &str) {}

    /// A task finished (including cancellation and panics).
    fn on_complete(&self, _task: &str, _outcome: &TaskOutcome) {}

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
