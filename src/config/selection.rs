//! Selection configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::registry::DEFAULT_HEALTH_THRESHOLD;
use crate::routing::{CacheTtlMode, SelectorConfig};

/// `[selection]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub cache_ttl_seconds: u64,
    pub cache_ttl_mode: CacheTtlMode,
    /// Error rate at or above which a backend is reported unhealthy
    pub health_threshold: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: 60,
            cache_ttl_mode: CacheTtlMode::default(),
            health_threshold: DEFAULT_HEALTH_THRESHOLD,
        }
    }
}

impl From<&SelectionConfig> for SelectorConfig {
    fn from(config: &SelectionConfig) -> Self {
        SelectorConfig {
            cache_ttl: Duration::from_secs(config.cache_ttl_seconds),
            cache_ttl_mode: config.cache_ttl_mode,
        }
    }
}
