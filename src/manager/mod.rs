//! Routing manager: retries, timeouts and failover on top of the selector
//!
//! [`RoutingManager::run_with_best_backend`] drives a bounded sequence of
//! attempts. Each attempt selects a backend, races the caller's work against
//! that backend's timeout and feeds the outcome back into the registry. A
//! failed attempt excludes its backend through [`Selector::failover`] and
//! backs off linearly before the next one. The call always resolves to an
//! [`ExecutionResult`].

use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::Instant;

pub mod error;
pub mod result;
pub mod retry;

pub use error::ExecutionError;
pub use result::{ExecutionResult, UNKNOWN_BACKEND};
pub use retry::{FailureLatency, RetryPolicy};

use crate::config::RouterConfig;
use crate::registry::{BackendDescriptor, RankedBackend, Registry, DEFAULT_HEALTH_THRESHOLD};
use crate::routing::{Selector, TaskRequirements};
use crate::telemetry::{self, measure};

/// Front door of the routing layer. Owns handles to one registry and one
/// selector over it.
pub struct RoutingManager {
    registry: Arc<Registry>,
    selector: Arc<Selector>,
    policy: RwLock<RetryPolicy>,
    health_threshold: f64,
}

impl RoutingManager {
    /// Build a manager over an existing registry and selector.
    ///
    /// `selector` should have been built over `registry`.
    pub fn new(registry: Arc<Registry>, selector: Arc<Selector>, policy: RetryPolicy) -> Self {
        if !Arc::ptr_eq(&registry, selector.registry()) {
            tracing::warn!("Routing manager built with a selector over a different registry");
        }
        Self {
            registry,
            selector,
            policy: RwLock::new(normalize(policy)),
            health_threshold: DEFAULT_HEALTH_THRESHOLD,
        }
    }

    /// Build a fresh registry, selector and manager from configuration and
    /// register the configured backends.
    pub fn from_config(config: &RouterConfig) -> Self {
        let registry = Arc::new(Registry::new());
        let selector = Arc::new(Selector::new(registry.clone(), config.selector_config()));
        let manager = Self::new(registry, selector, config.retry_policy())
            .with_health_threshold(config.selection.health_threshold);
        manager.register_backends(config.descriptors());
        manager
    }

    /// Error-rate cutoff used by [`RoutingManager::healthy_backends`].
    pub fn with_health_threshold(mut self, threshold: f64) -> Self {
        self.health_threshold = threshold;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn selector(&self) -> &Arc<Selector> {
        &self.selector
    }

    /// Run `work` against the best backend for `requirements`, retrying on
    /// other backends when it fails or times out.
    ///
    /// `work` is called once per attempt with the attempt's backend. At most
    /// `max_retries` attempts are made. Retrying stops early when no other
    /// backend is left.
    pub async fn run_with_best_backend<T, E, F, Fut>(
        &self,
        requirements: &TaskRequirements,
        work: F,
    ) -> ExecutionResult<T>
    where
        F: FnMut(BackendDescriptor) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        measure(
            "manager.run_with_best_backend",
            self.run_attempts(requirements, work),
        )
        .await
    }

    async fn run_attempts<T, E, F, Fut>(
        &self,
        requirements: &TaskRequirements,
        mut work: F,
    ) -> ExecutionResult<T>
    where
        F: FnMut(BackendDescriptor) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let policy = self.retry_policy();
        let mut attempt: u32 = 0;
        let mut failed_attempts: u32 = 0;

        let error = loop {
            attempt += 1;

            let backend = match self.selector.select(requirements) {
                Ok(selection) => selection.backend,
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "No backend available, giving up");
                    break ExecutionError::from(e);
                }
            };

            if let Err(e) = self.registry.set_current(&backend.id) {
                tracing::debug!(backend_id = %backend.id, error = %e, "Could not pin current backend");
            }

            let timeout = backend
                .timeout_ms()
                .map(Duration::from_millis)
                .unwrap_or(policy.default_timeout);
            let backend_id = backend.id.clone();

            tracing::debug!(
                backend_id = %backend_id,
                attempt,
                timeout_ms = timeout.as_millis() as u64,
                "Starting attempt"
            );

            let start = Instant::now();
            let outcome = tokio::time::timeout(timeout, work(backend)).await;
            let elapsed = start.elapsed();

            let error = match outcome {
                Ok(Ok(data)) => {
                    let latency_ms = elapsed.as_millis() as u64;
                    self.registry.record_outcome(&backend_id, true, latency_ms);
                    metrics::counter!(telemetry::ATTEMPTS_TOTAL, "backend" => backend_id.clone(), "status" => "ok")
                        .increment(1);
                    metrics::histogram!(telemetry::BACKEND_LATENCY_SECONDS, "backend" => backend_id.clone())
                        .record(elapsed.as_secs_f64());
                    tracing::info!(
                        backend_id = %backend_id,
                        latency_ms,
                        retries = failed_attempts,
                        "Request succeeded"
                    );
                    return ExecutionResult::succeeded(data, backend_id, latency_ms, failed_attempts);
                }
                Ok(Err(e)) => ExecutionError::Work {
                    backend_id: backend_id.clone(),
                    message: e.to_string(),
                },
                Err(_) => ExecutionError::Timeout {
                    backend_id: backend_id.clone(),
                    timeout_ms: timeout.as_millis() as u64,
                },
            };

            failed_attempts += 1;
            let status = if error.is_timeout() { "timeout" } else { "error" };
            metrics::counter!(telemetry::ATTEMPTS_TOTAL, "backend" => backend_id.clone(), "status" => status)
                .increment(1);
            self.registry
                .record_outcome(&backend_id, false, policy.failure_latency_ms(elapsed));
            tracing::warn!(
                backend_id = %backend_id,
                attempt,
                max_retries = policy.max_retries,
                error = %error,
                "Attempt failed"
            );

            if attempt >= policy.max_retries {
                break error;
            }
            if self.selector.failover(&backend_id, requirements).is_none() {
                tracing::warn!(
                    backend_id = %backend_id,
                    attempt,
                    "No failover backend left, stopping early"
                );
                break error;
            }

            let delay = policy.delay_for(attempt);
            tracing::debug!(delay_ms = delay.as_millis() as u64, "Backing off before retry");
            tokio::time::sleep(delay).await;
        };

        metrics::counter!(telemetry::RETRIES_EXHAUSTED_TOTAL).increment(1);
        tracing::error!(retries = failed_attempts, error = %error, "All attempts failed");
        ExecutionResult::failed(error, failed_attempts)
    }

    /// Register or overwrite a backend.
    pub fn register_backend(&self, descriptor: BackendDescriptor) {
        self.registry.register_backend(descriptor);
        self.selector.clear_cache();
    }

    pub fn register_backends(&self, descriptors: impl IntoIterator<Item = BackendDescriptor>) {
        self.registry.register_backends(descriptors);
        self.selector.clear_cache();
    }

    /// Remove a backend and forget that it failed. Returns `false` if unknown.
    pub fn unregister_backend(&self, id: &str) -> bool {
        let removed = self.registry.unregister_backend(id);
        self.selector.reset_failed(Some(id));
        removed
    }

    pub fn set_enabled(&self, id: &str, enabled: bool) -> bool {
        let changed = self.registry.set_enabled(id, enabled);
        self.selector.clear_cache();
        changed
    }

    /// Zero one backend's statistics, or all of them.
    ///
    /// A global reset also clears every failure exclusion.
    pub fn reset_performance(&self, id: Option<&str>) -> bool {
        let reset = self.registry.reset_performance(id);
        match id {
            Some(_) => self.selector.clear_cache(),
            None => self.selector.reset_failed(None),
        }
        reset
    }

    /// Change the attempt bound and back-off unit of later calls.
    pub fn configure_retry(&self, max_retries: u32, base_retry_delay: Duration) {
        let mut policy = self.policy_write();
        *policy = normalize(RetryPolicy {
            max_retries,
            base_retry_delay,
            ..*policy
        });
        tracing::info!(
            max_retries = policy.max_retries,
            base_retry_delay_ms = policy.base_retry_delay.as_millis() as u64,
            "Updated retry policy"
        );
    }

    pub fn set_retry_policy(&self, policy: RetryPolicy) {
        *self.policy_write() = normalize(policy);
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        *self.policy.read().unwrap_or_else(|poisoned| {
            tracing::warn!("Retry policy lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn policy_write(&self) -> std::sync::RwLockWriteGuard<'_, RetryPolicy> {
        self.policy.write().unwrap_or_else(|poisoned| {
            tracing::warn!("Retry policy lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Drop every backend, failure exclusion and cached selection.
    pub fn clear_all(&self) {
        self.registry.clear();
        self.selector.reset_failed(None);
    }

    /// Backend of the most recent attempt, while still registered and enabled.
    pub fn current_backend(&self) -> Option<BackendDescriptor> {
        self.registry.current_backend()
    }

    pub fn healthy_backends(&self) -> Vec<BackendDescriptor> {
        self.registry.healthy_backends(self.health_threshold)
    }

    /// Reporting view of the enabled backends, best first.
    pub fn report(&self) -> Vec<RankedBackend> {
        self.registry.ranked_best()
    }
}

/// At least one attempt is always made.
fn normalize(mut policy: RetryPolicy) -> RetryPolicy {
    if policy.max_retries == 0 {
        tracing::warn!("max_retries of 0 raised to 1");
        policy.max_retries = 1;
    }
    policy
}
