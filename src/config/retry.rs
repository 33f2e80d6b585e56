use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Conflict-retry settings for the transaction executor.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// First backoff delay; doubles per conflict.
    /// TOML: `retry.base_delay_ms`. Default: `100`.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Cap on a single backoff delay.
    /// TOML: `retry.max_delay_ms`. Default: `5000`.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Total attempts per operation, first one included. `0` retries forever.
    /// TOML: `retry.max_attempts`. Default: `10`.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Wall-clock budget per operation across all attempts. `0` disables it.
    /// TOML: `retry.deadline_ms`. Default: `0`.
    #[serde(default)]
    pub deadline_ms: u64,

    /// Randomize each delay.
    /// TOML: `retry.jitter`. Default: `true`.
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn max_attempts(&self) -> Option<usize> {
        (self.max_attempts > 0).then_some(self.max_attempts)
    }

    pub fn deadline(&self) -> Option<Duration> {
        (self.deadline_ms > 0).then(|| Duration::from_millis(self.deadline_ms))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: default_max_attempts(),
            deadline_ms: 0,
            jitter: default_jitter(),
        }
    }
}

fn default_base_delay_ms() -> u64 {
    100
}

fn default_max_delay_ms() -> u64 {
    5_000
}

fn default_max_attempts() -> usize {
    10
}

fn default_jitter() -> bool {
    true
}
