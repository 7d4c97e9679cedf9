//! # Server status record and its one-line summary.
//!
//! [`ServerStatus`] mirrors the counters a remote RPC server reports;
//! [`StatusSummary`] derives rates and renders them compactly:
//!
//! ```text
//! RPCs: 1520 [48.2/s] + SRPCs: 12 [310.0/s] (9300 exec); IO R: 1.2 MB [3.4 kB/s], IO W: 880.0 kB [2.1 kB/s] (5.5 kB/s total); 512.0 µs / RPC (poll: 12.0 µs, exec: 500.0 µs) & 1.1 ms / stream
//! ```

use std::fmt;

/// Counters and rates reported by the remote server.
///
/// Times are in seconds, rates per second, sizes in bytes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ServerStatus {
    /// Server version string.
    pub version: String,
    /// Total bytes read from clients.
    pub bytes_read: u64,
    /// Total bytes written to clients.
    pub bytes_written: u64,
    /// Current read rate.
    pub bytes_read_rate: f64,
    /// Current write rate.
    pub bytes_written_rate: f64,
    /// Total RPCs executed.
    pub rpcs_executed: u64,
    /// Current RPC rate.
    pub rpc_rate: f64,
    /// Time spent per RPC update.
    pub time_per_rpc_update: f64,
    /// Polling part of `time_per_rpc_update`.
    pub poll_time_per_rpc_update: f64,
    /// Execution part of `time_per_rpc_update`.
    pub exec_time_per_rpc_update: f64,
    /// Number of active stream RPCs.
    pub stream_rpcs: u64,
    /// Total stream RPC executions.
    pub stream_rpcs_executed: u64,
    /// Current stream RPC rate.
    pub stream_rpc_rate: f64,
    /// Time spent per stream update.
    pub time_per_stream_update: f64,
}

/// Derived, display-ready view of a [`ServerStatus`].
#[derive(Clone, Debug, PartialEq)]
pub struct StatusSummary {
    /// Total RPCs executed.
    pub rpcs: u64,
    /// RPCs per second.
    pub rpc_rate: f64,
    /// Active stream RPCs.
    pub stream_rpcs: u64,
    /// Stream RPC executions per second.
    pub stream_rpc_rate: f64,
    /// Total stream RPC executions.
    pub stream_rpcs_executed: u64,
    /// Total bytes read by the server.
    pub bytes_read: u64,
    /// Bytes read per second.
    pub read_rate: f64,
    /// Total bytes written by the server.
    pub bytes_written: u64,
    /// Bytes written per second.
    pub write_rate: f64,
    /// Read plus write rate.
    pub throughput: f64,
    /// Seconds per RPC update.
    pub rpc_update: f64,
    /// Polling seconds per RPC update.
    pub rpc_poll: f64,
    /// Execution seconds per RPC update.
    pub rpc_exec: f64,
    /// Seconds per stream update.
    pub stream_update: f64,
}

impl From<&ServerStatus> for StatusSummary {
    fn from(s: &ServerStatus) -> Self {
        Self {
            rpcs: s.rpcs_executed,
            rpc_rate: s.rpc_rate,
            stream_rpcs: s.stream_rpcs,
            stream_rpc_rate: s.stream_rpc_rate,
            stream_rpcs_executed: s.stream_rpcs_executed,
            bytes_read: s.bytes_read,
            read_rate: s.bytes_read_rate,
            bytes_written: s.bytes_written,
            write_rate: s.bytes_written_rate,
            throughput: s.bytes_read_rate + s.bytes_written_rate,
            rpc_update: s.time_per_rpc_update,
            rpc_poll: s.poll_time_per_rpc_update,
            rpc_exec: s.exec_time_per_rpc_update,
            stream_update: s.time_per_stream_update,
        }
    }
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RPCs: {} [{:.1}/s] + SRPCs: {} [{:.1}/s] ({} exec); ",
            self.rpcs,
            self.rpc_rate,
            self.stream_rpcs,
            self.stream_rpc_rate,
            self.stream_rpcs_executed
        )?;
        write!(
            f,
            "IO R: {} [{}/s], IO W: {} [{}/s] ({}/s total); ",
            bytes(self.bytes_read as f64),
            bytes(self.read_rate),
            bytes(self.bytes_written as f64),
            bytes(self.write_rate),
            bytes(self.throughput)
        )?;
        write!(
            f,
            "{} / RPC (poll: {}, exec: {}) & {} / stream",
            seconds(self.rpc_update),
            seconds(self.rpc_poll),
            seconds(self.rpc_exec),
            seconds(self.stream_update)
        )
    }
}

/// `1234.0` → `"1.2 kB"` (decimal prefixes).
fn bytes(n: f64) -> String {
    const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];
    let mut value = n.max(0.0);
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{value:.0} {}", UNITS[0])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// `0.0005` → `"500.0 µs"`.
fn seconds(s: f64) -> String {
    let s = s.max(0.0);
    if s == 0.0 {
        "0 s".to_string()
    } else if s < 1e-6 {
        format!("{:.1} ns", s * 1e9)
    } else if s < 1e-3 {
        format!("{:.1} µs", s * 1e6)
    } else if s < 1.0 {
        format!("{:.1} ms", s * 1e3)
    } else {
        format!("{s:.1} s")
    }
}
