//! # Shutdown policy applied when an interrupt arrives.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// What the signal listener does with an operator interrupt.
///
/// Parsed from its textual form (`"now"`, `"ask"`, `"ask soft"`, or the
/// long names `"immediate"`, `"confirm"`, `"confirm-or-force"`). Any other
/// string is a [`ConfigError::UnknownShutdownMode`].
///
/// ```
/// use missionvisor::ShutdownMode;
///
/// assert_eq!("ask soft".parse::<ShutdownMode>().unwrap(), ShutdownMode::ConfirmOrForceOnRepeat);
/// assert!("later".parse::<ShutdownMode>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShutdownMode {
    /// Shut down on the first interrupt.
    Immediate,
    /// Ask the operator; only an explicit "yes" shuts down.
    Confirm,
    /// Ask the operator; a second interrupt while the question is pending
    /// (or the prompt channel closing) forces the shutdown.
    #[default]
    ConfirmOrForceOnRepeat,
}

impl ShutdownMode {
    /// Short form used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownMode::Immediate => "now",
            ShutdownMode::Confirm => "ask",
            ShutdownMode::ConfirmOrForceOnRepeat => "ask soft",
        }
    }

    /// True for the modes that prompt the operator.
    pub fn asks(&self) -> bool {
        !matches!(self, ShutdownMode::Immediate)
    }
}

impl fmt::Display for ShutdownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShutdownMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "now" | "immediate" => Ok(ShutdownMode::Immediate),
            "ask" | "confirm" => Ok(ShutdownMode::Confirm),
            "ask soft" | "confirm-or-force" => Ok(ShutdownMode::ConfirmOrForceOnRepeat),
            _ => Err(ConfigError::UnknownShutdownMode(s.to_string())),
        }
    }
}
