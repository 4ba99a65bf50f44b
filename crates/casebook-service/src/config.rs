//! Retry configuration for compare-and-swap writes

use serde::Deserialize;
use std::time::Duration;

/// How read-modify-write sequences react to concurrent modification
///
/// A write that loses a revision race is re-read and re-applied up to
/// `max_attempts` times in total, sleeping with capped exponential backoff
/// in between.
///
/// # Examples
///
/// ```
/// use casebook_service::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::default();
/// assert_eq!(config.max_attempts, 4);
/// assert_eq!(config.backoff(1), Duration::from_millis(100));
/// assert_eq!(config.backoff(2), Duration::from_millis(200));
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Delay before the first retry (milliseconds)
    pub base_delay_ms: u64,

    /// Upper bound for any single delay (milliseconds)
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 100,
            max_delay_ms: 2_000,
        }
    }
}

impl RetryConfig {
    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Many fast retries, for tests that race writers against each other
    pub fn eager() -> Self {
        Self {
            max_attempts: 16,
            base_delay_ms: 1,
            max_delay_ms: 10,
        }
    }

    /// Attempt budget, never below one
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay after the `attempt`-th failed attempt (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self.base_delay_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 4);
        assert_eq!(config.base_delay_ms, 100);
        assert_eq!(config.max_delay_ms, 2_000);
    }

    #[test]
    fn test_backoff_is_capped() {
        let config = RetryConfig::default();
        assert_eq!(config.backoff(3), Duration::from_millis(400));
        assert_eq!(config.backoff(10), Duration::from_millis(2_000));
        assert_eq!(config.backoff(u32::MAX), Duration::from_millis(2_000));
    }

    #[test]
    fn test_attempts_floor() {
        let config = RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        };
        assert_eq!(config.attempts(), 1);
        assert_eq!(RetryConfig::none().attempts(), 1);
    }

    #[test]
    fn test_partial_deserialize() {
        let config: RetryConfig = serde_json::from_str(r#"{"max_attempts": 9}"#).unwrap();
        assert_eq!(config.max_attempts, 9);
        assert_eq!(config.base_delay_ms, 100);
    }
}
