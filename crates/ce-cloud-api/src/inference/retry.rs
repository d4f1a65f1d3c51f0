//! Retry policy for throttled model calls.

use std::time::Duration;

use crate::config::parse_var;

/// Bounded exponential backoff.
///
/// `max_attempts` counts every call, the first one included. The wait before
/// retry `n` (zero-based) is `initial_wait * multiplier^n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_wait: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_wait: Duration::from_secs(1),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    pub(crate) fn from_vars(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        Self {
            max_attempts: parse_var(lookup, "BEDROCK_MAX_ATTEMPTS").unwrap_or(default.max_attempts),
            initial_wait: parse_var(lookup, "BEDROCK_INITIAL_BACKOFF_MS")
                .map(Duration::from_millis)
                .unwrap_or(default.initial_wait),
            multiplier: default.multiplier,
        }
    }

    /// Attempt cap, never below one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Wait after the given wait, saturating instead of overflowing.
    pub fn next_wait(&self, current: Duration) -> Duration {
        current.saturating_mul(self.multiplier)
    }

    /// Every wait the policy can sleep, in order. One fewer than the
    /// attempt cap: there is no wait after the last attempt.
    pub fn schedule(&self) -> Vec<Duration> {
        let mut waits = Vec::new();
        let mut wait = self.initial_wait;
        for _ in 1..self.attempts() {
            waits.push(wait);
            wait = self.next_wait(wait);
        }
        waits
    }
}
