//! # Supervised task units.
//!
//! - [`TaskRole`] / [`TaskOutcome`] / [`TaskReport`] classification and results
//! - `SupervisedTask` a spawned unit: name, role, cancellation token, join handle
//! - `TaskSet` the supervisor's ordered collection of background units
//! - `Instrumented` the future wrapper that drives [`Observer`](crate::Observer) callbacks

mod instrument;
mod outcome;
mod set;
mod supervised;

pub(crate) use set::TaskSet;
pub use outcome::{AsOutcome, TaskOutcome, TaskReport, TaskRole};
pub(crate) use supervised::SupervisedTask;
