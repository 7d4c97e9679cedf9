//! Remote service access.
//!
//! - [`Connector`] / [`Connection`] blocking seams to the RPC client library
//! - [`ConnectionTarget`] endpoint + client identity
//! - [`ReconnectingConnector`] retries refused connects with a fixed backoff
//! - [`HeartbeatMonitor`] periodic status poll on a secondary connection
//! - [`ServerStatus`] / [`StatusSummary`] status record and its log line

mod client;
mod heartbeat;
mod reconnect;
mod status;
mod target;

pub(crate) use client::close_connection;
pub use client::{Connection, Connector};
pub use heartbeat::HeartbeatMonitor;
pub use reconnect::ReconnectingConnector;
pub use status::{ServerStatus, StatusSummary};
pub use target::ConnectionTarget;
