//! Retry configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::manager::{FailureLatency, RetryPolicy};

/// `[retry]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub default_timeout_ms: u64,
    pub failure_latency: FailureLatency,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            default_timeout_ms: 30_000,
            failure_latency: FailureLatency::default(),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy {
            max_retries: config.max_retries,
            base_retry_delay: Duration::from_millis(config.base_delay_ms),
            default_timeout: Duration::from_millis(config.default_timeout_ms),
            failure_latency: config.failure_latency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy() {
        let policy: RetryPolicy = (&RetryConfig::default()).into();
        assert_eq!(policy, RetryPolicy::default());
    }

    #[test]
    fn parses_elapsed_failure_latency() {
        let config: RetryConfig = toml::from_str(r#"failure_latency = "elapsed""#).unwrap();
        assert_eq!(config.failure_latency, FailureLatency::Elapsed);
        assert_eq!(config.max_retries, 3);
    }
}
