//! Runtime core: the supervisor and its lifecycle.
//!
//! - [`supervisor`]: start sequence, run bound and teardown;
//! - [`builder`]: wires config, connector, bridge, prompt and observers;
//! - [`state`]: lifecycle state and the idempotent shutdown handle;
//! - [`report`]: what `start` returns.

mod builder;
mod report;
mod state;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use report::{TerminalOutcome, TerminalReport};
pub use state::{ShutdownHandle, SupervisorState};
pub use supervisor::Supervisor;
