//! # Reconnecting connector.
//!
//! ```text
//! loop {
//!   ├─► attempt += 1
//!   ├─► spawn_blocking(connector.connect(target))   (not interrupted mid-call)
//!   ├─► token cancelled? ─► close late handle, Err(Canceled)
//!   └─► match result
//!         ├─ Ok(conn)        ─► return conn
//!         ├─ Err(Refused)    ─► log, sleep(backoff.next(attempt - 1)) (cancellable), continue
//!         └─ Err(other)      ─► Err(Fatal)
//! }
//! ```
//!
//! Refusals are never surfaced to the caller: `run` ends with a connection,
//! a fatal error, or a cancellation.

use std::sync::Arc;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::connect::client::close_connection;
use crate::connect::{Connection, ConnectionTarget, Connector};
use crate::error::{ConnectError, TaskError};
use crate::policies::BackoffPolicy;

/// Retries a blocking connect until it succeeds, fails fatally, or is cancelled.
pub struct ReconnectingConnector {
    connector: Arc<dyn Connector>,
    target: ConnectionTarget,
    backoff: BackoffPolicy,
}

impl ReconnectingConnector {
    /// Creates a connector for `target` waiting `backoff` between refused attempts.
    pub fn new(connector: Arc<dyn Connector>, target: ConnectionTarget, backoff: BackoffPolicy) -> Self {
        Self {
            connector,
            target,
            backoff,
        }
    }

    /// Endpoint and identity used for every attempt.
    pub fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    /// Connects, retrying refused attempts.
    ///
    /// ### Cancellation
    /// - During backoff: the sleep is aborted immediately.
    /// - During an attempt: observed once the blocking call returns; a handle
    ///   obtained that late is closed before `Err(Canceled)` is returned.
    pub async fn run(&self, token: CancellationToken) -> Result<Box<dyn Connection>, TaskError> {
        let mut attempt: u32 = 0;

        loop {
            if token.is_cancelled() {
                return Err(TaskError::Canceled);
            }
            attempt += 1;
            info!(target = %self.target, attempt, "connecting");

            let res = self.attempt().await?;
            if token.is_cancelled() {
                if let Ok(conn) = res {
                    debug!(target = %self.target, "connected after cancellation, closing");
                    close_connection(conn).await;
                }
                debug!(target = %self.target, "connector cancelled");
                return Err(TaskError::Canceled);
            }

            match res {
                Ok(conn) => {
                    info!(target = %self.target, attempt, "connected");
                    return Ok(conn);
                }
                Err(e) if e.is_retryable() => {
                    let delay = self.backoff.next(attempt - 1);
                    error!(
                        target = %self.target,
                        attempt,
                        "connection refused, is the remote service running?"
                    );
                    debug!(delay_ms = delay.as_millis() as u64, "waiting before next connection attempt");

                    select! {
                        biased;
                        _ = token.cancelled() => {
                            debug!(target = %self.target, "connector cancelled during backoff");
                            return Err(TaskError::Canceled);
                        }
                        _ = time::sleep(delay) => {}
                    }
                }
                Err(e) => {
                    error!(target = %self.target, attempt, error = %e, "connection failed");
                    return Err(e.into());
                }
            }
        }
    }

    /// One connect call on the blocking pool.
    async fn attempt(&self) -> Result<Result<Box<dyn Connection>, ConnectError>, TaskError> {
        let connector = Arc::clone(&self.connector);
        let target = self.target.clone();
        tokio::task::spawn_blocking(move || connector.connect(&target))
            .await
            .map_err(|e| TaskError::Fatal {
                error: format!("connect attempt panicked: {e}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{ScriptedConnector, Step};
    use std::time::{Duration, Instant};

    fn connector(script: Vec<Step>, backoff: Duration) -> (Arc<ScriptedConnector>, ReconnectingConnector) {
        let stub = Arc::new(ScriptedConnector::new(script));
        let rc = ReconnectingConnector::new(
            stub.clone(),
            ConnectionTarget::named("test"),
            BackoffPolicy::constant(backoff),
        );
        (stub, rc)
    }

    #[tokio::test]
    async fn refused_attempts_are_retried_after_backoff() {
        let backoff = Duration::from_millis(20);
        let (stub, rc) = connector(vec![Step::Refuse, Step::Refuse, Step::Refuse, Step::Succeed], backoff);

        let started = Instant::now();
        let conn = rc.run(CancellationToken::new()).await.expect("fourth attempt succeeds");
        assert!(started.elapsed() >= backoff * 3);

        let attempts = stub.attempts();
        assert_eq!(attempts.len(), 4, "exactly three retries");
        for pair in attempts.windows(2) {
            assert!(pair[1].at.duration_since(pair[0].at) >= backoff);
        }
        conn.close();
        assert_eq!(stub.closed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn default_backoff_waits_ten_seconds_between_attempts() {
        let stub = Arc::new(ScriptedConnector::new(vec![Step::Refuse, Step::Refuse]));
        let rc = ReconnectingConnector::new(
            stub.clone(),
            ConnectionTarget::named("test"),
            BackoffPolicy::default(),
        );

        let started = time::Instant::now();
        let conn = rc.run(CancellationToken::new()).await.expect("third attempt succeeds");
        assert!(started.elapsed() >= Duration::from_secs(20));
        assert!(started.elapsed() < Duration::from_secs(30));
        assert_eq!(stub.attempts().len(), 3);
        conn.close();
    }

    #[tokio::test]
    async fn non_refused_error_is_fatal() {
        let (stub, rc) = connector(vec![Step::Fail("handshake rejected")], Duration::from_millis(1));

        let err = rc.run(CancellationToken::new()).await.err().expect("fatal");
        assert!(matches!(err, TaskError::Fatal { ref error } if error.contains("handshake rejected")));
        assert_eq!(stub.attempts().len(), 1);
    }

    #[tokio::test]
    async fn cancellation_aborts_backoff() {
        let (stub, rc) = connector(vec![Step::Refuse], Duration::from_secs(60));
        let token = CancellationToken::new();

        let run = tokio::spawn({
            let token = token.clone();
            async move { rc.run(token).await.map(|_| ()) }
        });
        crate::testkit::wait_until(|| stub.attempts().len() == 1).await;
        token.cancel();

        let res = time::timeout(Duration::from_secs(1), run).await.expect("sleep aborted").unwrap();
        assert_eq!(res, Err(TaskError::Canceled));
    }

    #[tokio::test]
    async fn connection_obtained_after_cancellation_is_closed() {
        let (gate, step) = Step::gated();
        let (stub, rc) = connector(vec![step], Duration::from_millis(1));
        let token = CancellationToken::new();

        let run = tokio::spawn({
            let token = token.clone();
            async move { rc.run(token).await.map(|_| ()) }
        });
        crate::testkit::wait_until(|| stub.attempts().len() == 1).await;
        token.cancel();
        gate.send(()).unwrap();

        assert_eq!(run.await.unwrap(), Err(TaskError::Canceled));
        assert_eq!(stub.opened(), 1);
        assert_eq!(stub.closed(), 1);
    }

    #[tokio::test]
    async fn precancelled_token_makes_no_attempt() {
        let (stub, rc) = connector(vec![], Duration::from_millis(1));
        let token = CancellationToken::new();
        token.cancel();

        assert_eq!(rc.run(token).await.map(|_| ()), Err(TaskError::Canceled));
        assert!(stub.attempts().is_empty());
    }
}
