//! Error types used by the missionvisor runtime and its tasks.
//!
//! - [`ConnectError`] failures reported by a [`Connector`](crate::Connector) or [`Connection`](crate::Connection).
//! - [`TaskError`] how a supervised task ended when it did not complete normally.
//! - [`PromptError`] failures of the interactive confirmation channel.
//! - [`ConfigError`] invalid or unreadable configuration.
//! - [`RuntimeError`] errors returned by [`Supervisor::start`](crate::Supervisor::start).
//!
//! Every enum provides `as_label` (stable snake_case label for logs/metrics).

use std::path::PathBuf;

use thiserror::Error;

/// # Errors produced by the remote connect operation.
///
/// `Refused` is the only transient condition: the remote service is not
/// listening yet, so the attempt is retried after a backoff.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// The remote endpoint refused the connection (service not started yet).
    #[error("connection refused by {address}:{port}")]
    Refused {
        /// Address that was dialled.
        address: String,
        /// Port that refused the connection.
        port: u16,
    },

    /// Any other failure; never retried.
    #[error("connection failed: {reason}")]
    Failed {
        /// The underlying error message.
        reason: String,
    },
}

impl ConnectError {
    /// Shorthand for [`ConnectError::Failed`].
    pub fn failed(reason: impl Into<String>) -> Self {
        ConnectError::Failed {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConnectError::Refused { .. } => "connect_refused",
            ConnectError::Failed { .. } => "connect_failed",
        }
    }

    /// Indicates whether another attempt may succeed.
    ///
    /// # Example
    /// ```
    /// use missionvisor::ConnectError;
    ///
    /// let refused = ConnectError::Refused { address: "127.0.0.1".into(), port: 50000 };
    /// assert!(refused.is_retryable());
    /// assert!(!ConnectError::failed("bad handshake").is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConnectError::Refused { .. })
    }
}

impl From<std::io::Error> for ConnectError {
    /// Maps `ErrorKind::ConnectionRefused` to [`ConnectError::Refused`] (address unknown),
    /// everything else to [`ConnectError::Failed`].
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::ConnectionRefused => ConnectError::Refused {
                address: String::new(),
                port: 0,
            },
            _ => ConnectError::Failed {
                reason: err.to_string(),
            },
        }
    }
}

/// # Ways a supervised task can end without completing.
///
/// `Canceled` is a normal outcome: the task observed its cancellation token,
/// released what it held and stopped.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Non-recoverable error (not retried).
    #[error("fatal error (no retry): {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// The task failed while running (e.g. a status poll failed).
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task was cancelled by its supervisor.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use missionvisor::TaskError;
    ///
    /// assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// True for [`TaskError::Canceled`].
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }
}

impl From<ConnectError> for TaskError {
    fn from(err: ConnectError) -> Self {
        TaskError::Fatal {
            error: err.to_string(),
        }
    }
}

/// # Errors of the interactive confirmation channel.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PromptError {
    /// The channel closed before an answer was read (EOF).
    #[error("confirmation channel closed")]
    Closed,

    /// Reading or writing the channel failed.
    #[error("confirmation channel i/o: {0}")]
    Io(#[from] std::io::Error),
}

impl PromptError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PromptError::Closed => "prompt_closed",
            PromptError::Io(_) => "prompt_io",
        }
    }
}

/// # Configuration errors.
///
/// Raised while building a [`Config`](crate::Config); a misconfigured value is
/// never silently replaced with a default.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The shutdown mode string is not one of the known modes.
    #[error("unknown shutdown mode {0:?} (expected \"now\", \"ask\" or \"ask soft\")")]
    UnknownShutdownMode(String),

    /// The configuration text is not valid TOML or has wrong types.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("cannot read configuration {path}: {source}")]
    Read {
        /// Path of the file.
        path: PathBuf,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The connect backoff settings cannot produce a usable schedule.
    #[error("invalid connect backoff: {0}")]
    InvalidBackoff(String),

    /// [`SupervisorBuilder::build`](crate::SupervisorBuilder::build) was called without a connector.
    #[error("no connector configured")]
    MissingConnector,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::UnknownShutdownMode(_) => "config_unknown_shutdown_mode",
            ConfigError::Parse(_) => "config_parse",
            ConfigError::Read { .. } => "config_read",
            ConfigError::InvalidBackoff(_) => "config_invalid_backoff",
            ConfigError::MissingConnector => "config_missing_connector",
        }
    }
}

/// # Errors produced by the supervisor itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The primary connection failed with a non-retryable error; background
    /// tasks were cancelled before this was returned.
    #[error("startup aborted: {source}")]
    Startup {
        /// Why the connector gave up.
        #[source]
        source: TaskError,
    },

    /// [`Supervisor::start`](crate::Supervisor::start) was called more than once.
    #[error("supervisor already started")]
    AlreadyStarted,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use missionvisor::{RuntimeError, TaskError};
    ///
    /// let err = RuntimeError::Startup { source: TaskError::Canceled };
    /// assert_eq!(err.as_label(), "runtime_startup");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Startup { .. } => "runtime_startup",
            RuntimeError::AlreadyStarted => "runtime_already_started",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_refused_maps_to_retryable() {
        let io = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
        let err = ConnectError::from(io);
        assert!(err.is_retryable());
        assert_eq!(err.as_label(), "connect_refused");
    }

    #[test]
    fn other_io_errors_are_fatal() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err = ConnectError::from(io);
        assert!(!err.is_retryable());
        assert_eq!(TaskError::from(err).as_label(), "task_fatal");
    }

    #[test]
    fn startup_error_keeps_source() {
        let err = RuntimeError::Startup {
            source: TaskError::Fatal {
                error: "handshake".into(),
            },
        };
        assert!(err.to_string().contains("handshake"));
    }
}
