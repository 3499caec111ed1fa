//! Shared test utilities for Switchyard integration tests.
//!
//! Provides builders for backends, selectors and managers so each test file
//! only states what differs.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use switchyard::manager::{RetryPolicy, RoutingManager};
use switchyard::registry::{
    AccuracyTier, BackendDescriptor, BackendLimits, Capabilities, Registry, SpeedTier,
};
use switchyard::routing::{CacheTtlMode, Selector, SelectorConfig};

// =============================================================================
// Backend Builders
// =============================================================================

/// Plain backend with default capabilities.
pub fn backend(id: &str, priority: i32) -> BackendDescriptor {
    BackendDescriptor::new(id, format!("Backend {}", id), "test", "model").with_priority(priority)
}

/// Backend accepting image input.
pub fn vision_backend(id: &str, priority: i32) -> BackendDescriptor {
    backend(id, priority).with_capabilities(Capabilities {
        vision: true,
        reasoning: false,
        speed: SpeedTier::Medium,
        accuracy: AccuracyTier::Medium,
    })
}

/// Backend with a per-attempt timeout.
pub fn backend_with_timeout(id: &str, priority: i32, timeout_ms: u64) -> BackendDescriptor {
    backend(id, priority).with_limits(BackendLimits {
        timeout_ms: Some(timeout_ms),
        ..Default::default()
    })
}

// =============================================================================
// Component Builders
// =============================================================================

pub fn selector_config(ttl_secs: u64, mode: CacheTtlMode) -> SelectorConfig {
    SelectorConfig {
        cache_ttl: Duration::from_secs(ttl_secs),
        cache_ttl_mode: mode,
    }
}

/// Registry pre-populated with `backends` plus a selector over it.
pub fn registry_and_selector(
    backends: Vec<BackendDescriptor>,
    config: SelectorConfig,
) -> (Arc<Registry>, Selector) {
    let registry = Arc::new(Registry::new());
    registry.register_backends(backends);
    let selector = Selector::new(registry.clone(), config);
    (registry, selector)
}

/// Retry policy with a short back-off.
pub fn retry_policy(max_retries: u32, base_delay_ms: u64) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_retry_delay: Duration::from_millis(base_delay_ms),
        ..Default::default()
    }
}

pub fn manager_with(backends: Vec<BackendDescriptor>, policy: RetryPolicy) -> RoutingManager {
    let registry = Arc::new(Registry::new());
    let selector = Arc::new(Selector::new(registry.clone(), SelectorConfig::default()));
    let manager = RoutingManager::new(registry, selector, policy);
    manager.register_backends(backends);
    manager
}
