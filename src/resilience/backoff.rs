//! Fixed-interval backoff with optional jitter.

use rand::Rng;
use std::time::Duration;

/// Delay applied between unsuccessful fetch attempts.
///
/// The interval is the same after an empty result and after a fetch fault.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    interval: Duration,
    jitter_ratio: f64,
}

impl BackoffPolicy {
    /// Five minutes between attempts.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);

    /// A policy that always waits exactly `interval`.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            jitter_ratio: 0.0,
        }
    }

    /// Add up to `ratio * interval` of random extra delay. Clamped to [0, 1).
    pub fn with_jitter(mut self, ratio: f64) -> Self {
        self.jitter_ratio = if ratio.is_finite() { ratio.clamp(0.0, 0.99) } else { 0.0 };
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Delay before the next attempt.
    pub fn delay(&self) -> Duration {
        let base_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX);
        let jitter_range = (base_ms as f64 * self.jitter_ratio) as u64;
        let jitter = if jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        };

        Duration::from_millis(base_ms.saturating_add(jitter))
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::fixed(Self::DEFAULT_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_interval() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay(), Duration::from_secs(300));
        assert_eq!(policy.delay(), policy.delay());
    }

    #[test]
    fn test_jitter_bounds() {
        let policy = BackoffPolicy::fixed(Duration::from_millis(1000)).with_jitter(0.1);
        for _ in 0..100 {
            let d = policy.delay().as_millis();
            assert!((1000..1100).contains(&d), "delay {} out of range", d);
        }
    }

    #[test]
    fn test_jitter_clamped() {
        let policy = BackoffPolicy::fixed(Duration::from_secs(1)).with_jitter(-3.0);
        assert_eq!(policy.delay(), Duration::from_secs(1));

        let policy = BackoffPolicy::fixed(Duration::from_secs(1)).with_jitter(f64::NAN);
        assert_eq!(policy.delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_huge_interval_saturates() {
        let interval = Duration::from_secs(u64::MAX / 1000 + 1);
        let policy = BackoffPolicy::fixed(interval);
        assert_eq!(policy.delay(), Duration::from_millis(u64::MAX));

        let policy = BackoffPolicy::fixed(Duration::from_millis(u64::MAX - 1)).with_jitter(0.5);
        for _ in 0..10 {
            assert!(policy.delay() >= Duration::from_millis(u64::MAX - 1));
        }
    }
}
