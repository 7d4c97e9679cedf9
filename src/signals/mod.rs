//! Interrupt handling.
//!
//! - [`ShutdownBridge`] cross-context event set by the OS handler (or anyone) and awaited by tasks
//! - [`ShutdownMode`]   policy for turning an interrupt into a shutdown
//! - [`ConfirmPrompt`]  blocking operator prompt ([`StdinPrompt`] for terminals)
//! - [`SignalBridge`]   the listener task tying the three together

mod bridge;
mod listener;
mod mode;
mod prompt;

pub use bridge::ShutdownBridge;
pub use listener::{SignalBridge, CONFIRM_QUESTION};
pub use mode::ShutdownMode;
pub use prompt::{Confirmation, ConfirmPrompt, StdinPrompt};
