//! # Heartbeat monitor.
//!
//! Opens its own connection (secondary identity `"<name>:heartbeat"`), then
//! polls the server status every `interval` and logs one summary line.
//!
//! ## Rules
//! - The connection is closed on every exit path before the result propagates.
//! - A failed poll is returned as [`TaskError::Fail`], never skipped.
//! - Cancellation is observed between polls (the sleep is the suspension point).

use std::sync::Arc;
use std::time::Duration;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::connect::client::close_connection;
use crate::connect::{
    Connection, ConnectionTarget, Connector, ReconnectingConnector, ServerStatus, StatusSummary,
};
use crate::error::TaskError;
use crate::policies::BackoffPolicy;

/// Periodic status poller.
pub struct HeartbeatMonitor {
    connector: ReconnectingConnector,
    interval: Duration,
}

impl HeartbeatMonitor {
    /// Creates a monitor polling `target`'s server every `interval`.
    pub fn new(
        connector: Arc<dyn Connector>,
        target: &ConnectionTarget,
        backoff: BackoffPolicy,
        interval: Duration,
    ) -> Self {
        Self {
            connector: ReconnectingConnector::new(connector, target.secondary("heartbeat"), backoff),
            interval,
        }
    }

    /// Identity used by the heartbeat connection.
    pub fn target(&self) -> &ConnectionTarget {
        self.connector.target()
    }

    /// Connects and polls until cancelled or a poll fails.
    pub async fn run(&self, token: CancellationToken) -> Result<(), TaskError> {
        let mut conn = self.connector.run(token.clone()).await?;

        loop {
            let (back, res) = poll_status(conn).await;
            let Some(back) = back else {
                return res.map(|_| ());
            };
            conn = back;

            match res {
                Ok(status) => debug!("heartbeat: {}", StatusSummary::from(&status)),
                Err(e) => {
                    error!(target = %self.target(), error = %e, "heartbeat poll failed");
                    close_connection(conn).await;
                    return Err(e);
                }
            }

            select! {
                biased;
                _ = token.cancelled() => {
                    debug!("heartbeat cancelled, closing connection");
                    close_connection(conn).await;
                    return Err(TaskError::Canceled);
                }
                _ = time::sleep(self.interval) => {}
            }
        }
    }
}

/// Polls on the blocking pool and hands the connection back.
///
/// Returns `None` for the connection only if the poll panicked.
async fn poll_status(
    mut conn: Box<dyn Connection>,
) -> (Option<Box<dyn Connection>>, Result<ServerStatus, TaskError>) {
    let polled = tokio::task::spawn_blocking(move || {
        let res = conn.status();
        (conn, res)
    })
    .await;

    match polled {
        Ok((conn, res)) => (
            Some(conn),
            res.map_err(|e| TaskError::Fail {
                error: e.to_string(),
            }),
        ),
        Err(join) => (
            None,
            Err(TaskError::Fail {
                error: format!("status poll panicked: {join}"),
            }),
        ),
    }
}
