use crate::sender::SendError;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_IN_MILLIS: u64 = 200;
pub const DEFAULT_MAX_DELAY_IN_MILLIS: u64 = 5000;

/// Exponential backoff for transient send failures, applied per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            Duration::from_millis(DEFAULT_BASE_DELAY_IN_MILLIS),
            Duration::from_millis(DEFAULT_MAX_DELAY_IN_MILLIS),
        )
    }
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: max_delay.max(base_delay),
        }
    }

    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Delay to wait after the given failed attempt (1-based): `base * 2^(attempt - 1)`, capped.
    pub fn backoff(
        &self,
        attempt: u32,
    ) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);

        self.base_delay.checked_mul(1u32 << exponent).map(|delay| delay.min(self.max_delay)).unwrap_or(self.max_delay)
    }

    pub fn should_retry(
        &self,
        error: &SendError,
        attempts: u32,
    ) -> bool {
        error.is_transient() && attempts < self.max_attempts
    }
}
