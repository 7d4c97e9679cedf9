//! # Supervisor configuration.
//!
//! [`Config`] defines the supervisor's behavior: client identity and
//! endpoint, shutdown mode, run bound, heartbeat interval, connect backoff
//! and the teardown grace period.
//!
//! Built in code from [`Config::default`], or read from TOML with
//! [`Config::from_toml_str`] / [`Config::load`]. Every TOML key is optional;
//! durations are in milliseconds.
//!
//! ```toml
//! name = "curious"
//! shutdown_mode = "ask soft"
//! max_run_ms = 30000          # 0 = run until shut down
//! heartbeat_interval_ms = 5000
//! connect_backoff_ms = 10000      # delay after the first refusal
//! connect_backoff_max_ms = 10000  # defaults to connect_backoff_ms
//! connect_backoff_factor = 1.0    # growth per refusal, >= 1
//! connect_jitter = "none"         # "none" | "full" | "equal"
//! grace_ms = 5000
//!
//! [target]
//! address = "127.0.0.1"
//! rpc_port = 50000
//! stream_port = 50001
//! ```
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use missionvisor::{Config, ShutdownMode};
//!
//! let mut cfg = Config::default();
//! cfg.shutdown_mode = ShutdownMode::Immediate;
//! cfg.max_run = Duration::ZERO;
//!
//! assert_eq!(cfg.max_run_limit(), None);
//! assert_eq!(cfg.name(), "curious");
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::connect::ConnectionTarget;
use crate::error::ConfigError;
use crate::policies::{BackoffPolicy, JitterPolicy};
use crate::signals::ShutdownMode;

/// Runtime configuration for a [`Supervisor`](crate::Supervisor).
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Endpoint and client identity (`target.name`) of the primary connection.
    pub target: ConnectionTarget,
    /// What an operator interrupt does.
    pub shutdown_mode: ShutdownMode,
    /// Upper bound on the run after connecting (0 = unbounded).
    pub max_run: Duration,
    /// Delay between two status polls.
    pub heartbeat_interval: Duration,
    /// Delay schedule between refused connect attempts.
    pub connect_backoff: BackoffPolicy,
    /// How long teardown waits for a task before warning again (0 = never warn).
    pub grace: Duration,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `target = ConnectionTarget::default()` (`curious` on `127.0.0.1:50000/50001`)
    /// - `shutdown_mode = ShutdownMode::ConfirmOrForceOnRepeat`
    /// - `max_run = 30s`
    /// - `heartbeat_interval = 5s`
    /// - `connect_backoff = BackoffPolicy::constant(10s)`
    /// - `grace = 5s`
    fn default() -> Self {
        Self {
            target: ConnectionTarget::default(),
            shutdown_mode: ShutdownMode::default(),
            max_run: Duration::from_secs(30),
            heartbeat_interval: Duration::from_secs(5),
            connect_backoff: BackoffPolicy::default(),
            grace: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Client name announced to the remote service.
    pub fn name(&self) -> &str {
        &self.target.name
    }

    /// Returns `None` if `max_run == 0` (unbounded), otherwise `Some(max_run)`.
    #[inline]
    pub fn max_run_limit(&self) -> Option<Duration> {
        if self.max_run == Duration::ZERO {
            None
        } else {
            Some(self.max_run)
        }
    }

    /// Returns `None` if `grace == 0` (wait silently), otherwise `Some(grace)`.
    #[inline]
    pub fn grace_warning(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }

    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;
        raw.into_config()
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// On-disk form of [`Config`].
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    name: Option<String>,
    target: Option<ConnectionTarget>,
    shutdown_mode: Option<String>,
    max_run_ms: Option<u64>,
    heartbeat_interval_ms: Option<u64>,
    connect_backoff_ms: Option<u64>,
    connect_backoff_max_ms: Option<u64>,
    connect_backoff_factor: Option<f64>,
    connect_jitter: Option<JitterPolicy>,
    grace_ms: Option<u64>,
}

impl RawConfig {
    fn into_config(self) -> Result<Config, ConfigError> {
        let mut cfg = Config::default();
        cfg.connect_backoff = self.backoff(cfg.connect_backoff)?;
        if let Some(target) = self.target {
            cfg.target = target;
        }
        if let Some(name) = self.name {
            cfg.target.name = name;
        }
        if let Some(mode) = self.shutdown_mode {
            cfg.shutdown_mode = mode.parse()?;
        }
        if let Some(ms) = self.max_run_ms {
            cfg.max_run = Duration::from_millis(ms);
        }
        if let Some(ms) = self.heartbeat_interval_ms {
            cfg.heartbeat_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.grace_ms {
            cfg.grace = Duration::from_millis(ms);
        }
        Ok(cfg)
    }

    fn backoff(&self, default: BackoffPolicy) -> Result<BackoffPolicy, ConfigError> {
        let first = self
            .connect_backoff_ms
            .map_or(default.first, Duration::from_millis);
        let max = self.connect_backoff_max_ms.map_or(first, Duration::from_millis);
        let factor = self.connect_backoff_factor.unwrap_or(default.factor);

        if !factor.is_finite() || factor < 1.0 {
            return Err(ConfigError::InvalidBackoff(format!(
                "factor must be a finite number >= 1, got {factor}"
            )));
        }
        if max < first {
            return Err(ConfigError::InvalidBackoff(format!(
                "max {}ms is below first {}ms",
                max.as_millis(),
                first.as_millis()
            )));
        }
        Ok(BackoffPolicy {
            first,
            max,
            factor,
            jitter: self.connect_jitter.unwrap_or(default.jitter),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn reads_every_key() {
        let cfg = Config::from_toml_str(
            r#"
            name = "rover"
            shutdown_mode = "now"
            max_run_ms = 0
            heartbeat_interval_ms = 250
            connect_backoff_ms = 1500
            grace_ms = 0

            [target]
            address = "10.0.0.7"
            rpc_port = 6000
            "#,
        )
        .unwrap();

        assert_eq!(cfg.name(), "rover");
        assert_eq!(cfg.target.address, "10.0.0.7");
        assert_eq!(cfg.target.rpc_port, 6000);
        assert_eq!(cfg.target.stream_port, 50001);
        assert_eq!(cfg.shutdown_mode, ShutdownMode::Immediate);
        assert_eq!(cfg.max_run_limit(), None);
        assert_eq!(cfg.grace_warning(), None);
        assert_eq!(cfg.heartbeat_interval, Duration::from_millis(250));
        assert_eq!(cfg.connect_backoff.next(4), Duration::from_millis(1500));
    }

    #[test]
    fn backoff_growth_and_jitter_are_configurable() {
        let cfg = Config::from_toml_str(
            r#"
            connect_backoff_ms = 100
            connect_backoff_max_ms = 800
            connect_backoff_factor = 2.0
            connect_jitter = "equal"
            "#,
        )
        .unwrap();

        let backoff = cfg.connect_backoff;
        assert_eq!(backoff.first, Duration::from_millis(100));
        assert_eq!(backoff.max, Duration::from_millis(800));
        assert_eq!(backoff.factor, 2.0);
        assert_eq!(backoff.jitter, JitterPolicy::Equal);
        // equal jitter keeps at least half of the capped delay
        let late = backoff.next(6);
        assert!(late >= Duration::from_millis(400) && late <= Duration::from_millis(800));
    }

    #[test]
    fn unusable_backoff_is_rejected() {
        for doc in [
            "connect_backoff_factor = 0.5",
            "connect_backoff_ms = 1000\nconnect_backoff_max_ms = 10",
        ] {
            let err = Config::from_toml_str(doc).unwrap_err();
            assert_eq!(err.as_label(), "config_invalid_backoff", "{doc}");
        }

        let err = Config::from_toml_str(r#"connect_jitter = "sometimes""#).unwrap_err();
        assert_eq!(err.as_label(), "config_parse");
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = Config::from_toml_str(r#"shutdown_mode = "whenever""#).unwrap_err();
        assert_eq!(err.as_label(), "config_unknown_shutdown_mode");
    }

    #[test]
    fn wrong_types_and_unknown_keys_are_rejected() {
        let err = Config::from_toml_str("max_run_ms = \"soon\"").unwrap_err();
        assert_eq!(err.as_label(), "config_parse");

        let err = Config::from_toml_str("restart = true").unwrap_err();
        assert_eq!(err.as_label(), "config_parse");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = Config::load("/nonexistent/missionvisor.toml").unwrap_err();
        assert_eq!(err.as_label(), "config_read");
        assert!(err.to_string().contains("/nonexistent/missionvisor.toml"));
    }
}
