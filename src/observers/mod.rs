//! # Observers: scheduling hooks for supervised tasks.
//!
//! Every future the supervisor spawns is wrapped so that observers see:
//! ```text
//!   on_spawn ──► on_resume ──► (poll) ──► on_suspend ──► on_resume ──► ... ──► on_complete
//! ```
//! `on_complete` is reported exactly once per task: when its future returns,
//! or when its join reports a panic.
//!
//! ## Provided observers
//! - [`TraceObserver`]     one `trace!` line per resume/suspend (hides selected tasks)
//! - [`LongBlockObserver`] `warn!` when a single poll holds the scheduler too long
//! - [`CrashObserver`]     `error!` for failed or panicked tasks
//!
//! Observers run inline on the polling thread: keep them cheap and non-blocking.
//! A panicking observer is caught and logged; it does not affect the task.

mod crash;
mod longblock;
mod observer;
mod set;
mod trace;

pub use crash::CrashObserver;
pub use longblock::LongBlockObserver;
pub use observer::{Observer, SpawnInfo};
pub use set::ObserverSet;
pub use trace::TraceObserver;
