//! # Supervisor lifecycle state.
//!
//! ```text
//! Idle ──start()──► Running ──shutdown / max_run / fatal──► ShuttingDown ──► Terminated
//! ```
//!
//! The state lives in a `watch` channel so any task can observe transitions.
//! A shutdown request is a `CancellationToken` the supervisor waits on; the
//! first accepted request is logged, every later one is a no-op.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Lifecycle stage of a [`Supervisor`](crate::Supervisor).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SupervisorState {
    /// Built, not started.
    Idle,
    /// Tasks are running.
    Running,
    /// Teardown in progress.
    ShuttingDown,
    /// Every task has ended.
    Terminated,
}

impl SupervisorState {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorState::Idle => "idle",
            SupervisorState::Running => "running",
            SupervisorState::ShuttingDown => "shutting_down",
            SupervisorState::Terminated => "terminated",
        }
    }

    /// True for `ShuttingDown` and `Terminated`.
    pub fn is_stopping(&self) -> bool {
        matches!(self, SupervisorState::ShuttingDown | SupervisorState::Terminated)
    }
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

pub(crate) struct Shared {
    state: watch::Sender<SupervisorState>,
    request: CancellationToken,
    requested: AtomicBool,
}

impl Shared {
    pub(crate) fn new() -> Arc<Self> {
        let (state, _) = watch::channel(SupervisorState::Idle);
        Arc::new(Self {
            state,
            request: CancellationToken::new(),
            requested: AtomicBool::new(false),
        })
    }

    pub(crate) fn state(&self) -> SupervisorState {
        *self.state.borrow()
    }

    pub(crate) fn watch(&self) -> watch::Receiver<SupervisorState> {
        self.state.subscribe()
    }

    pub(crate) fn set_state(&self, next: SupervisorState) {
        let prev = self.state.send_replace(next);
        if prev != next {
            info!(from = %prev, to = %next, "supervisor state");
        }
    }

    /// Cancelled by the first accepted shutdown request.
    pub(crate) fn request(&self) -> &CancellationToken {
        &self.request
    }
}

/// Cloneable handle requesting a graceful shutdown.
///
/// Safe to call from any task, any number of times.
#[derive(Clone)]
pub struct ShutdownHandle {
    shared: Arc<Shared>,
}

impl ShutdownHandle {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Requests a graceful shutdown.
    ///
    /// No-op once the supervisor is shutting down or terminated, or when a
    /// request was already accepted.
    pub fn shutdown(&self) {
        let state = self.shared.state();
        if state.is_stopping() {
            debug!(%state, "shutdown ignored");
            return;
        }
        if self.shared.requested.swap(true, Ordering::AcqRel) {
            debug!("shutdown already requested");
            return;
        }
        info!("shutdown requested");
        self.shared.request.cancel();
    }

    /// True once a shutdown request was accepted.
    pub fn is_requested(&self) -> bool {
        self.shared.request.is_cancelled()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SupervisorState {
        self.shared.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_requests_cancel_once() {
        let shared = Shared::new();
        let a = ShutdownHandle::new(Arc::clone(&shared));
        let b = a.clone();

        a.shutdown();
        b.shutdown();
        assert!(a.is_requested());
        assert!(shared.request().is_cancelled());
    }

    #[test]
    fn ignored_while_stopping() {
        let shared = Shared::new();
        shared.set_state(SupervisorState::ShuttingDown);

        let handle = ShutdownHandle::new(Arc::clone(&shared));
        handle.shutdown();
        assert!(!handle.is_requested());
        assert_eq!(handle.state(), SupervisorState::ShuttingDown);
    }
}
