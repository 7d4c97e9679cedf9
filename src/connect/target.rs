//! # Remote endpoint description.

use std::fmt;

use serde::Deserialize;

/// Where and as whom to connect.
///
/// `name` is the client identity announced to the remote service; the
/// heartbeat connects as a secondary identity derived with [`secondary`](Self::secondary).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionTarget {
    /// Client name shown by the remote service.
    pub name: String,
    /// Host name or IP address.
    pub address: String,
    /// Port of the RPC server.
    pub rpc_port: u16,
    /// Port of the stream server.
    pub stream_port: u16,
}

impl Default for ConnectionTarget {
    /// `curious` on `127.0.0.1`, RPC port `50000`, stream port `50001`.
    fn default() -> Self {
        Self {
            name: "curious".to_string(),
            address: "127.0.0.1".to_string(),
            rpc_port: 50000,
            stream_port: 50001,
        }
    }
}

impl ConnectionTarget {
    /// Default endpoint under the given client name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Same endpoint, identity `"<name>:<role>"`.
    ///
    /// ```
    /// use missionvisor::ConnectionTarget;
    ///
    /// let main = ConnectionTarget::named("curious");
    /// assert_eq!(main.secondary("heartbeat").name, "curious:heartbeat");
    /// ```
    pub fn secondary(&self, role: &str) -> Self {
        Self {
            name: format!("{}:{role}", self.name),
            ..self.clone()
        }
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' at {} [rpc={}, stream={}]",
            self.name, self.address, self.rpc_port, self.stream_port
        )
    }
}
