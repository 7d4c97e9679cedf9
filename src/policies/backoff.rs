//! # Backoff policy for connect retries.
//!
//! The delay after the `n`-th refused attempt (0-indexed) is `first × factor^n`,
//! clamped to `max`, then jittered. The base is derived from the attempt number
//! alone, so jitter never feeds back into later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use missionvisor::{BackoffPolicy, JitterPolicy};
//!
//! let fixed = BackoffPolicy::constant(Duration::from_secs(10));
//! assert_eq!(fixed.next(0), Duration::from_secs(10));
//! assert_eq!(fixed.next(7), Duration::from_secs(10));
//!
//! let growing = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(1),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//! assert_eq!(growing.next(1), Duration::from_millis(200));
//! assert_eq!(growing.next(10), Duration::from_secs(1));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Delay schedule between retry attempts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first refused attempt.
    pub first: Duration,
    /// Upper bound for any delay.
    pub max: Duration,
    /// Multiplicative growth factor (`1.0` = constant).
    pub factor: f64,
    /// Randomization applied to the clamped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Constant 10s delay without jitter.
    fn default() -> Self {
        Self::constant(Duration::from_secs(10))
    }
}

impl BackoffPolicy {
    /// Fixed delay between attempts.
    pub fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Computes the delay following the given attempt number (0-indexed).
    pub fn next(&self, attempt: u32) -> Duration {
        let exp = attempt.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };
        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_ten_seconds_constant() {
        let policy = BackoffPolicy::default();
        for attempt in 0..5 {
            assert_eq!(policy.next(attempt), Duration::from_secs(10));
        }
    }

    #[test]
    fn exponential_growth_is_capped() {
        let policy = BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_millis(500),
            factor: 2.0,
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(0), Duration::from_millis(100));
        assert_eq!(policy.next(2), Duration::from_millis(400));
        assert_eq!(policy.next(3), Duration::from_millis(500));
        assert_eq!(policy.next(u32::MAX), Duration::from_millis(500));
    }

    #[test]
    fn first_above_max_is_clamped() {
        let policy = BackoffPolicy {
            first: Duration::from_secs(10),
            max: Duration::from_secs(5),
            factor: 1.0,
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(0), Duration::from_secs(5));
    }

    #[test]
    fn full_jitter_never_exceeds_base() {
        let policy = BackoffPolicy {
            jitter: JitterPolicy::Full,
            ..BackoffPolicy::constant(Duration::from_millis(300))
        };
        for attempt in 0..50 {
            assert!(policy.next(attempt) <= Duration::from_millis(300));
        }
    }
}
