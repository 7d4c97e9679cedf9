//! # Remote service seams.
//!
//! Both traits are **blocking**: the runtime always calls them through
//! `tokio::task::spawn_blocking`, never from a scheduler thread.

use crate::connect::{ConnectionTarget, ServerStatus};
use crate::error::ConnectError;

/// Opens connections to the remote service.
pub trait Connector: Send + Sync + 'static {
    /// Connects to `target`.
    ///
    /// Return [`ConnectError::Refused`] when the service is not listening yet
    /// (the caller retries); any other error is treated as fatal.
    fn connect(&self, target: &ConnectionTarget) -> Result<Box<dyn Connection>, ConnectError>;
}

/// An open connection, owned by exactly one task.
pub trait Connection: Send + 'static {
    /// Queries the server's counters and rates.
    fn status(&mut self) -> Result<ServerStatus, ConnectError>;

    /// Releases the connection.
    fn close(self: Box<Self>);
}

/// Closes `conn` on the blocking pool and waits for it.
pub(crate) async fn close_connection(conn: Box<dyn Connection>) {
    if let Err(e) = tokio::task::spawn_blocking(move || conn.close()).await {
        tracing::warn!(error = %e, "closing connection panicked");
    }
}
