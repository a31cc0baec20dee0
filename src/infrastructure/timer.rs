use crate::types::{DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS};
use std::time::Duration;

/// Reconnection policy with exponential backoff and an attempt ceiling.
///
/// The delay for attempt `n` is `base_delay × 2^n`. The attempt counter is the only
/// input to both the delay and terminal-failure detection.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    attempt: u32,
    base_delay: Duration,
    max_attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            attempt: 0,
            base_delay,
            max_attempts,
        }
    }

    /// Delay scheduled for the given attempt number (0-indexed)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Records a failure and returns the delay before the next retry, or `None`
    /// once `max_attempts` retries have already been scheduled.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }

        let delay = self.delay_for(self.attempt);
        self.attempt += 1;
        Some(delay)
    }

    /// Reset the attempt counter (successful connection)
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            DEFAULT_MAX_ATTEMPTS,
        )
    }
}
