//! # missionvisor
//!
//! **Missionvisor** supervises one remote-control session against a long-lived
//! RPC service: it connects (retrying while the service is not up yet), keeps a
//! heartbeat on a secondary connection, turns operator interrupts into a
//! confirmed shutdown, and tears everything down gracefully.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   OS SIGINT ──► ShutdownBridge.set()            (any thread, lock-free)
//!                      │
//!                      ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                       │
//! │  - SupervisorState (watch channel)                                │
//! │  - ShutdownHandle (idempotent shutdown request)                   │
//! │  - TaskSet (background tasks, spawn order)                        │
//! │  - ObserverSet (spawn / resume / suspend / complete hooks)        │
//! └──────┬──────────────────────┬──────────────────────┬──────────────┘
//!        ▼                      ▼                      ▼
//! ┌──────────────────┐  ┌────────────────────┐  ┌──────────────────┐
//! │ signal-listener  │  │ connector          │  │ heartbeat        │
//! │ (Background)     │  │ (AwaitedLeaf)      │  │ (Background)     │
//! │ bridge ─► prompt │  │ refused ─► backoff │  │ own connection   │
//! │  ─► shutdown()   │  │ fatal ─► abort     │  │ poll ─► log line │
//! └──────────────────┘  └────────────────────┘  └──────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! Idle ─► Running ─► (connected) ─► shutdown request | max_run ─► ShuttingDown ─► Terminated
//!
//! teardown: cancel background tasks newest first, await each acknowledgement,
//!           close the primary connection, return TerminalReport
//! ```
//!
//! Blocking work (connect, status, close, operator prompt) always runs on the
//! blocking pool; cancellation is only observed at suspension points and each
//! task releases what it holds before acknowledging it.
//!
//! ## Features
//! | Area              | Description                                               | Key types / traits                          |
//! |-------------------|-----------------------------------------------------------|---------------------------------------------|
//! | **Supervision**   | Start sequence, run bound, graceful teardown.             | [`Supervisor`], [`SupervisorBuilder`]       |
//! | **Signals**       | Interrupt bridge and confirmation policy.                 | [`ShutdownBridge`], [`SignalBridge`], [`ShutdownMode`] |
//! | **Connections**   | Blocking seams, reconnect loop, heartbeat.                | [`Connector`], [`Connection`], [`ReconnectingConnector`], [`HeartbeatMonitor`] |
//! | **Observers**     | Scheduling hooks and the provided tracing observers.      | [`Observer`], [`LongBlockObserver`]         |
//! | **Policies**      | Delay between connect attempts.                           | [`BackoffPolicy`], [`JitterPolicy`]         |
//! | **Errors**        | Typed errors for connects, tasks, prompts and the runtime. | [`ConnectError`], [`TaskError`], [`RuntimeError`] |
//! | **Configuration** | Defaults in code or loaded from TOML.                     | [`Config`]                                  |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use missionvisor::{
//!     Config, ConnectError, Connection, ConnectionTarget, Connector, ServerStatus,
//!     ShutdownMode, SupervisorBuilder, TerminalOutcome, TraceObserver,
//! };
//!
//! struct Local;
//! struct Session;
//!
//! impl Connector for Local {
//!     fn connect(&self, _target: &ConnectionTarget) -> Result<Box<dyn Connection>, ConnectError> {
//!         Ok(Box::new(Session))
//!     }
//! }
//!
//! impl Connection for Session {
//!     fn status(&mut self) -> Result<ServerStatus, ConnectError> {
//!         Ok(ServerStatus::default())
//!     }
//!     fn close(self: Box<Self>) {}
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.shutdown_mode = ShutdownMode::Immediate;
//!     cfg.max_run = Duration::from_millis(50);
//!
//!     let sup = SupervisorBuilder::new(cfg)
//!         .connector(Arc::new(Local))
//!         .observer(Arc::new(TraceObserver::new()))
//!         .build()?;
//!
//!     let report = sup.start().await?;
//!     assert_eq!(report.outcome, TerminalOutcome::Timeout);
//!     Ok(())
//! }
//! ```
mod config;
mod connect;
mod core;
mod error;
mod observers;
mod policies;
mod signals;
mod tasks;

#[cfg(test)]
mod testkit;

// ---- Public re-exports ----

pub use self::core::{
    ShutdownHandle, Supervisor, SupervisorBuilder, SupervisorState, TerminalOutcome,
    TerminalReport,
};
pub use config::Config;
pub use connect::{
    Connection, ConnectionTarget, Connector, HeartbeatMonitor, ReconnectingConnector,
    ServerStatus, StatusSummary,
};
pub use error::{ConfigError, ConnectError, PromptError, RuntimeError, TaskError};
pub use observers::{
    CrashObserver, LongBlockObserver, Observer, ObserverSet, SpawnInfo, TraceObserver,
};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use signals::{
    ConfirmPrompt, Confirmation, ShutdownBridge, ShutdownMode, SignalBridge, StdinPrompt,
    CONFIRM_QUESTION,
};
pub use tasks::{AsOutcome, TaskOutcome, TaskReport, TaskRole};
