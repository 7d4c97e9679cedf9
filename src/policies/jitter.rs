//! # Jitter policy for retry delays.
//!
//! - [`JitterPolicy::None`] exact delays (default; keeps retry timing predictable)
//! - [`JitterPolicy::Full`] random delay in `[0, delay]`
//! - [`JitterPolicy::Equal`] `delay/2 + random[0, delay/2]`

use rand::Rng;
use serde::Deserialize;
use std::time::Duration;

/// Randomization applied on top of a computed backoff delay.
///
/// Read from configuration as `"none"`, `"full"` or `"equal"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JitterPolicy {
    /// Use the computed delay as is.
    #[default]
    None,
    /// Random delay in `[0, delay]`.
    Full,
    /// `delay/2 + random[0, delay/2]`; never less than half the delay.
    Equal,
}

impl JitterPolicy {
    /// Applies the jitter to `delay`.
    pub fn apply(&self, delay: Duration) -> Duration {
        let ms = delay.as_millis().min(u128::from(u64::MAX)) as u64;
        if ms == 0 {
            return delay;
        }
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => Duration::from_millis(rand::rng().random_range(0..=ms)),
            JitterPolicy::Equal => {
                let half = ms / 2;
                let extra = if half == 0 {
                    0
                } else {
                    rand::rng().random_range(0..=half)
                };
                Duration::from_millis(half + extra)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_identity() {
        let d = Duration::from_millis(1234);
        assert_eq!(JitterPolicy::None.apply(d), d);
    }

    #[test]
    fn equal_stays_in_upper_half() {
        let d = Duration::from_millis(1000);
        for _ in 0..100 {
            let j = JitterPolicy::Equal.apply(d);
            assert!(j >= Duration::from_millis(500) && j <= d, "{j:?}");
        }
    }

    #[test]
    fn zero_delay_is_untouched() {
        assert_eq!(JitterPolicy::Full.apply(Duration::ZERO), Duration::ZERO);
    }
}
