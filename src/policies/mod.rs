//! Retry delay policies.
//!
//! - [`BackoffPolicy`] how the delay between connect attempts evolves (first / factor / max + jitter)
//! - [`JitterPolicy`]  optional randomization of that delay
//!
//! The reconnecting connector uses [`BackoffPolicy::constant`] with a 10s delay
//! by default: a refused connection usually means the remote game is still
//! loading, so there is nothing to gain from growing the delay.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
