use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rolling outcome statistics for one backend.
///
/// Counters only grow until [`PerformanceRecord::reset`]. Latency is a
/// cumulative moving average over every recorded outcome, failures included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PerformanceRecord {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub average_latency_ms: f64,
    pub last_used_at: Option<DateTime<Utc>>,
    /// `failed_requests / total_requests`, 0 with no history
    pub error_rate: f64,
}

impl PerformanceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the record.
    pub fn record(&mut self, success: bool, latency_ms: u64) {
        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }

        let n = self.total_requests as f64;
        self.average_latency_ms = (self.average_latency_ms * (n - 1.0) + latency_ms as f64) / n;
        self.error_rate = self.failed_requests as f64 / n;
        self.last_used_at = Some(Utc::now());
    }

    /// True once at least one outcome has been recorded.
    pub fn has_history(&self) -> bool {
        self.total_requests > 0
    }

    /// `successful_requests / total_requests`, 0 with no history.
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.successful_requests as f64 / self.total_requests as f64
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
