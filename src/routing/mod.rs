//! Backend selection for each request
//!
//! The [`Selector`] filters the registry's enabled backends against a
//! request's [`TaskRequirements`], scores the survivors, and memoizes the
//! winner. Backends reported as failed are excluded from every candidate pool
//! until they are explicitly rehabilitated with [`Selector::reset_failed`].

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

pub mod cache;
pub mod error;
pub mod requirements;
pub mod scoring;

pub use cache::{CacheTtlMode, DEFAULT_CACHE_TTL};
pub use error::RoutingError;
pub use requirements::{TaskPriority, TaskRequirements};
pub use scoring::{score_candidate, ScoreBreakdown};

use crate::telemetry::{self, measure_sync};
use crate::registry::{BackendDescriptor, PerformanceRecord, Registry};
use cache::SelectionCache;

/// Number of runner-up backends reported with a selection.
pub const MAX_ALTERNATIVES: usize = 3;

/// Outcome of a successful selection.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SelectionResult {
    /// The winning backend
    pub backend: BackendDescriptor,
    /// Human-readable explanation of the choice
    pub reason: String,
    pub score: f64,
    /// Next-best candidates, best first
    pub alternatives: Vec<BackendDescriptor>,
}

/// Selector tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorConfig {
    pub cache_ttl: Duration,
    pub cache_ttl_mode: CacheTtlMode,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_ttl_mode: CacheTtlMode::default(),
        }
    }
}

/// Mutable selector state. Guarded by one mutex so a selection never
/// interleaves with failure bookkeeping.
#[derive(Debug)]
struct SelectorState {
    recently_failed: HashSet<String>,
    cache: SelectionCache,
}

/// Selector picks the best backend for a set of task requirements
pub struct Selector {
    /// Reference to backend registry
    registry: Arc<Registry>,

    state: Mutex<SelectorState>,
}

impl Selector {
    /// Create a selector over `registry`.
    pub fn new(registry: Arc<Registry>, config: SelectorConfig) -> Self {
        Self {
            registry,
            state: Mutex::new(SelectorState {
                recently_failed: HashSet::new(),
                cache: SelectionCache::new(config.cache_ttl, config.cache_ttl_mode),
            }),
        }
    }

    /// Get reference to the registry.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    fn state(&self) -> MutexGuard<'_, SelectorState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Selector state lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Select the best backend for the given requirements.
    ///
    /// # Errors
    ///
    /// Returns `RoutingError::NoCandidates` when no enabled, non-failed
    /// backend satisfies the requirements.
    pub fn select(&self, requirements: &TaskRequirements) -> Result<SelectionResult, RoutingError> {
        measure_sync("selector.select", || self.select_locked(requirements))
    }

    fn select_locked(
        &self,
        requirements: &TaskRequirements,
    ) -> Result<SelectionResult, RoutingError> {
        let key = requirements.cache_key();
        let now = Instant::now();
        let mut state = self.state();

        if let Some(cached) = state.cache.get(&key, now).cloned() {
            if self.still_eligible(&cached.backend, &state.recently_failed) {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                tracing::debug!(backend_id = %cached.backend.id, cache_key = %key, "Selection served from cache");
                return Ok(cached);
            }
            state.cache.remove(&key);
        }
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);

        let mut scored: Vec<(BackendDescriptor, ScoreBreakdown)> = self
            .filter_candidates(requirements, &state.recently_failed)
            .into_iter()
            .map(|(backend, performance)| {
                let breakdown = score_candidate(&backend, &performance, requirements);
                (backend, breakdown)
            })
            .collect();

        // Stable sort: equal scores keep registration order
        scored.sort_by(|a, b| b.1.score.total_cmp(&a.1.score));

        let mut ranked = scored.into_iter();
        let Some((backend, breakdown)) = ranked.next() else {
            metrics::counter!(telemetry::SELECTIONS_TOTAL, "outcome" => "no_candidates")
                .increment(1);
            tracing::warn!(cache_key = %key, "No backend satisfies requirements");
            return Err(RoutingError::NoCandidates { requirements: key });
        };
        let alternatives = ranked
            .take(MAX_ALTERNATIVES)
            .map(|(backend, _)| backend)
            .collect();

        let result = SelectionResult {
            reason: format!(
                "Selected {} ({}): {}",
                backend.name,
                backend.id,
                breakdown.factors.join(", ")
            ),
            score: breakdown.score,
            backend,
            alternatives,
        };

        metrics::counter!(telemetry::SELECTIONS_TOTAL, "outcome" => "selected").increment(1);
        tracing::debug!(
            backend_id = %result.backend.id,
            score = result.score,
            alternatives = result.alternatives.len(),
            "Selected backend"
        );

        state.cache.insert(key, result.clone(), now);
        Ok(result)
    }

    /// A cached winner is only reusable while it is still registered,
    /// enabled and not marked failed.
    fn still_eligible(&self, backend: &BackendDescriptor, failed: &HashSet<String>) -> bool {
        !failed.contains(&backend.id)
            && self
                .registry
                .get_backend(&backend.id)
                .is_some_and(|current| current.enabled)
    }

    /// Filter enabled backends by failure state, capabilities and latency
    fn filter_candidates(
        &self,
        requirements: &TaskRequirements,
        failed: &HashSet<String>,
    ) -> Vec<(BackendDescriptor, PerformanceRecord)> {
        let mut candidates = self.registry.enabled_with_performance();

        candidates.retain(|(backend, _)| !failed.contains(&backend.id));

        candidates.retain(|(backend, _)| {
            if requirements.requires_vision && !backend.capabilities.vision {
                return false;
            }
            if requirements.requires_reasoning && !backend.capabilities.reasoning {
                return false;
            }
            true
        });

        // Backends without history always pass the latency bound
        if let Some(max_latency_ms) = requirements.max_latency_ms {
            candidates.retain(|(_, performance)| {
                !performance.has_history() || performance.average_latency_ms <= max_latency_ms as f64
            });
        }

        candidates
    }

    /// Exclude a backend from selection until it is reset.
    ///
    /// Invalidates the whole cache.
    pub fn mark_failed(&self, id: &str) {
        let mut state = self.state();
        state.recently_failed.insert(id.to_string());
        state.cache.clear();
        tracing::info!(backend_id = %id, "Marked backend as failed");
    }

    /// Rehabilitate one failed backend, or all of them when `id` is `None`.
    ///
    /// Invalidates the whole cache.
    pub fn reset_failed(&self, id: Option<&str>) {
        let mut state = self.state();
        match id {
            Some(id) => {
                state.recently_failed.remove(id);
                tracing::info!(backend_id = %id, "Reset failed backend");
            }
            None => {
                state.recently_failed.clear();
                tracing::info!("Reset all failed backends");
            }
        }
        state.cache.clear();
    }

    /// Mark `failed_id` as failed and pick a replacement.
    ///
    /// Returns `None` when no candidate remains; never errors.
    pub fn failover(
        &self,
        failed_id: &str,
        requirements: &TaskRequirements,
    ) -> Option<BackendDescriptor> {
        self.mark_failed(failed_id);
        metrics::counter!(telemetry::FAILOVERS_TOTAL).increment(1);

        match self.select(requirements) {
            Ok(result) => {
                tracing::info!(
                    from = %failed_id,
                    to = %result.backend.id,
                    "Failed over to next backend"
                );
                Some(result.backend)
            }
            Err(e) => {
                tracing::warn!(from = %failed_id, error = %e, "No backend available for failover");
                None
            }
        }
    }

    /// Drop every cached selection.
    pub fn clear_cache(&self) {
        self.state().cache.clear();
    }

    /// Ids currently excluded from selection, sorted.
    pub fn recently_failed(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.state().recently_failed.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn is_failed(&self, id: &str) -> bool {
        self.state().recently_failed.contains(id)
    }

    /// Number of cached selections (fresh or not).
    pub fn cache_len(&self) -> usize {
        self.state().cache.len()
    }
}
