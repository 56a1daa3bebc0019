//! Retry policy for translation and write-back calls
//!
//! An explicit policy object instead of ad hoc loops: the delay schedule
//! is computable without sleeping, so it unit-tests deterministically.

use std::time::Duration;

#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Total attempts including the first (0 means never even try)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Multiplier applied per subsequent retry
    pub growth: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            growth: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following failed attempt `attempt`
    /// (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.growth.powi(attempt as i32);
        self.base_delay.mul_f64(factor)
    }

    /// The full schedule of delays between attempts.
    pub fn delays(&self) -> Vec<Duration> {
        (0..self.max_attempts.saturating_sub(1))
            .map(|i| self.delay_for(i))
            .collect()
    }
}
