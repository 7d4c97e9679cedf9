//! # Supervisor: connects, keeps the session alive, and tears it down gracefully.
//!
//! The [`Supervisor`] owns the configuration, the injected collaborators
//! (connector, interrupt bridge, confirmation prompt, observers) and the
//! lifecycle state. One call to [`Supervisor::start`] runs one session.
//!
//! ## High-level flow
//! ```text
//! start():
//!   Idle ─► Running
//!   spawn  signal-listener (Background)     bridge ─► (confirm) ─► shutdown()
//!   spawn  connector (AwaitedLeaf) and join it, racing the shutdown request
//!     ├─ Ok(conn)      ─► keep as primary connection
//!     ├─ Canceled      ─► teardown ─► Ok(report: cancelled)
//!     └─ Fatal         ─► teardown ─► Err(RuntimeError::Startup)
//!   spawn  heartbeat (Background)           own connection, polls every interval
//!   wait   shutdown request | max_run elapsed
//!
//! teardown:
//!   Running ─► ShuttingDown
//!   cancel background tasks newest first, await each acknowledgement
//!   (warn every `grace` while waiting, never abort)
//!   close primary connection
//!   ShuttingDown ─► Terminated
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use missionvisor::{
//!     Config, Connection, ConnectionTarget, ConnectError, Connector, ShutdownBridge,
//!     SupervisorBuilder,
//! };
//!
//! struct Offline;
//!
//! impl Connector for Offline {
//!     fn connect(&self, target: &ConnectionTarget) -> Result<Box<dyn Connection>, ConnectError> {
//!         Err(ConnectError::Refused { address: target.address.clone(), port: target.rpc_port })
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sup = SupervisorBuilder::new(Config::default())
//!         .connector(Arc::new(Offline))
//!         .bridge(ShutdownBridge::install_os_handler()?)
//!         .build()?;
//!
//!     let report = sup.start().await?;
//!     println!("session ended: {}", report.outcome);
//!     Ok(())
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::{select, sync::watch, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::report::{TerminalOutcome, TerminalReport};
use super::state::{Shared, ShutdownHandle, SupervisorState};
use crate::config::Config;
use crate::connect::{
    close_connection, Connection, Connector, HeartbeatMonitor, ReconnectingConnector,
};
use crate::error::{RuntimeError, TaskError};
use crate::observers::ObserverSet;
use crate::signals::{ConfirmPrompt, ShutdownBridge, SignalBridge};
use crate::tasks::{AsOutcome, TaskReport, TaskRole, TaskSet};

const SIGNAL_LISTENER: &str = "signal-listener";
const CONNECTOR: &str = "connector";
const HEARTBEAT: &str = "heartbeat";

/// Result of the connect phase.
enum Connected {
    Ready(Box<dyn Connection>),
    Cancelled,
    Fatal(TaskError),
}

/// Runs one remote-control session with graceful shutdown.
pub struct Supervisor {
    cfg: Config,
    connector: Arc<dyn Connector>,
    bridge: ShutdownBridge,
    prompt: Arc<dyn ConfirmPrompt>,
    observers: Arc<ObserverSet>,
    shared: Arc<Shared>,
    started: AtomicBool,
}

impl Supervisor {
    pub(crate) fn new_internal(
        cfg: Config,
        connector: Arc<dyn Connector>,
        bridge: ShutdownBridge,
        prompt: Arc<dyn ConfirmPrompt>,
        observers: Arc<ObserverSet>,
    ) -> Self {
        Self {
            cfg,
            connector,
            bridge,
            prompt,
            observers,
            shared: Shared::new(),
            started: AtomicBool::new(false),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Cloneable handle to request a shutdown from anywhere.
    pub fn handle(&self) -> ShutdownHandle {
        ShutdownHandle::new(Arc::clone(&self.shared))
    }

    /// Requests a graceful shutdown. Idempotent; see [`ShutdownHandle::shutdown`].
    pub fn shutdown(&self) {
        self.handle().shutdown();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SupervisorState {
        self.shared.state()
    }

    /// Receiver notified on every state transition.
    pub fn watch_state(&self) -> watch::Receiver<SupervisorState> {
        self.shared.watch()
    }

    /// Runs the session until a shutdown request or `max_run`, then tears it down.
    ///
    /// Every task spawned here has ended when this returns, on every path.
    /// Can be called once; later calls return [`RuntimeError::AlreadyStarted`].
    pub async fn start(&self) -> Result<TerminalReport, RuntimeError> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::AlreadyStarted);
        }

        let runtime_token = CancellationToken::new();
        let mut tasks = TaskSet::new(runtime_token, Arc::clone(&self.observers));
        self.shared.set_state(SupervisorState::Running);
        info!(
            name = self.cfg.name(),
            mode = %self.cfg.shutdown_mode,
            max_run_ms = self.cfg.max_run.as_millis() as u64,
            "supervisor started"
        );

        self.spawn_listener(&mut tasks);

        let (connector_report, connected) = self.connect(&tasks).await;
        let mut reports = vec![connector_report];

        let primary = match connected {
            Connected::Ready(conn) => conn,
            Connected::Cancelled => {
                reports.extend(self.teardown(&mut tasks, None).await);
                return Ok(self.finish(TerminalOutcome::Cancelled, reports));
            }
            Connected::Fatal(source) => {
                error!(error = %source, "connector failed, aborting startup");
                self.teardown(&mut tasks, None).await;
                return Err(RuntimeError::Startup { source });
            }
        };

        self.spawn_heartbeat(&mut tasks);
        let outcome = self.wait_for_end().await;

        reports.extend(self.teardown(&mut tasks, Some(primary)).await);
        Ok(self.finish(outcome, reports))
    }

    fn spawn_listener(&self, tasks: &mut TaskSet) {
        let handle = self.handle();
        let listener = SignalBridge::new(
            self.bridge.clone(),
            self.cfg.shutdown_mode,
            Arc::clone(&self.prompt),
            move || handle.shutdown(),
        );
        tasks.spawn(SIGNAL_LISTENER, move |token| async move { listener.listen(token).await });
    }

    fn spawn_heartbeat(&self, tasks: &mut TaskSet) {
        let monitor = HeartbeatMonitor::new(
            Arc::clone(&self.connector),
            &self.cfg.target,
            self.cfg.connect_backoff,
            self.cfg.heartbeat_interval,
        );
        tasks.spawn(HEARTBEAT, move |token| async move { monitor.run(token).await });
    }

    /// Runs the connector as an awaited leaf; a shutdown request cancels it.
    async fn connect(&self, tasks: &TaskSet) -> (TaskReport, Connected) {
        let connector = ReconnectingConnector::new(
            Arc::clone(&self.connector),
            self.cfg.target.clone(),
            self.cfg.connect_backoff,
        );
        let leaf = tasks.spawn_leaf(CONNECTOR, move |token| async move { connector.run(token).await });
        let joined = leaf.join_until(self.shared.request(), self.cfg.grace_warning()).await;

        let outcome = match &joined {
            Ok(res) => res.as_outcome(),
            Err(outcome) => outcome.clone(),
        };
        let report = TaskReport {
            name: CONNECTOR.to_string(),
            role: TaskRole::AwaitedLeaf,
            outcome,
        };

        let connected = match joined {
            Ok(Ok(conn)) => Connected::Ready(conn),
            Ok(Err(TaskError::Canceled)) => Connected::Cancelled,
            Ok(Err(e)) => Connected::Fatal(e),
            Err(outcome) => Connected::Fatal(TaskError::Fatal {
                error: outcome.to_string(),
            }),
        };
        (report, connected)
    }

    async fn wait_for_end(&self) -> TerminalOutcome {
        let request = self.shared.request();
        match self.cfg.max_run_limit() {
            None => {
                request.cancelled().await;
                TerminalOutcome::Cancelled
            }
            Some(limit) => select! {
                biased;
                _ = request.cancelled() => TerminalOutcome::Cancelled,
                _ = time::sleep(limit) => {
                    info!(max_run_ms = limit.as_millis() as u64, "max run reached");
                    TerminalOutcome::Timeout
                }
            },
        }
    }

    async fn teardown(
        &self,
        tasks: &mut TaskSet,
        primary: Option<Box<dyn Connection>>,
    ) -> Vec<TaskReport> {
        self.shared.set_state(SupervisorState::ShuttingDown);
        info!(tasks = ?tasks.names(), "shutting down");

        let reports = tasks.cancel_all(self.cfg.grace_warning()).await;
        if let Some(conn) = primary {
            close_connection(conn).await;
            debug!("primary connection closed");
        }

        self.shared.set_state(SupervisorState::Terminated);
        reports
    }

    fn finish(&self, outcome: TerminalOutcome, tasks: Vec<TaskReport>) -> TerminalReport {
        info!(outcome = %outcome, "supervisor terminated");
        TerminalReport { outcome, tasks }
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("name", &self.cfg.name())
            .field("state", &self.state())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
