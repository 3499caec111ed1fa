//! Retry policy for the execution loop

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_RETRY_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Latency recorded for a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailureLatency {
    /// Record 0ms. Pulls the moving average down for backends that fail fast.
    #[default]
    Zero,
    /// Record the time the attempt actually took.
    Elapsed,
}

impl FromStr for FailureLatency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zero" => Ok(FailureLatency::Zero),
            "elapsed" => Ok(FailureLatency::Elapsed),
            _ => Err(format!("Unknown failure latency mode: {}", s)),
        }
    }
}

/// Bounds and pacing of `run_with_best_backend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts per call, including the first
    pub max_retries: u32,
    /// Back-off unit; attempt `n` sleeps `n * base_retry_delay` before the next
    pub base_retry_delay: Duration,
    /// Used when the backend has no `limits.timeout_ms`
    pub default_timeout: Duration,
    pub failure_latency: FailureLatency,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_retry_delay: DEFAULT_BASE_RETRY_DELAY,
            default_timeout: DEFAULT_TIMEOUT,
            failure_latency: FailureLatency::default(),
        }
    }
}

impl RetryPolicy {
    /// Linear back-off after a failed `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_retry_delay.saturating_mul(attempt)
    }

    /// Latency to record for a failed attempt that ran for `elapsed`.
    pub fn failure_latency_ms(&self, elapsed: Duration) -> u64 {
        match self.failure_latency {
            FailureLatency::Zero => 0,
            FailureLatency::Elapsed => elapsed.as_millis() as u64,
        }
    }
}
