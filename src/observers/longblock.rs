//! # Long-block detector.
//!
//! A task that runs for a long time between two suspension points starves
//! every other task on a cooperative scheduler. [`LongBlockObserver`] times
//! each poll (`on_resume` → `on_suspend`/`on_complete`) and warns when it
//! exceeds `max_time`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::warn;

use super::Observer;
use crate::tasks::TaskOutcome;

/// Warns about polls longer than `max_time`.
#[derive(Debug)]
pub struct LongBlockObserver {
    max_time: Duration,
    running: Mutex<HashMap<String, Instant>>,
}

impl Default for LongBlockObserver {
    /// `max_time = 100ms`.
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl LongBlockObserver {
    /// Creates a detector with the given threshold.
    #[must_use]
    pub fn new(max_time: Duration) -> Self {
        Self {
            max_time,
            running: Mutex::new(HashMap::new()),
        }
    }

    /// Ends the current poll of `task`; returns its duration when over the threshold.
    fn finish(&self, task: &str) -> Option<Duration> {
        let started = self
            .running
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(task)?;
        let ran = started.elapsed();
        if ran > self.max_time {
            warn!(task, ran_ms = ran.as_millis() as u64, "task blocked the scheduler");
            Some(ran)
        } else {
            None
        }
    }
}

impl Observer for LongBlockObserver {
    fn on_resume(&self, task: &str) {
        self.running
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(task.to_string(), Instant::now());
    }

    fn on_suspend(&self, task: &str) {
        self.finish(task);
    }

    fn on_complete(&self, task: &str, _outcome: &TaskOutcome) {
        self.finish(task);
    }

    fn name(&self) -> &'static str {
        "LongBlockObserver"
    }
}
