//! Backend Registry module.
//!
//! Thread-safe in-memory catalog of backend descriptors and their rolling
//! performance records. The registry knows nothing about selection policy.

mod backend;
mod error;
mod performance;
pub mod ranking;

pub use backend::*;
pub use error::*;
pub use performance::*;
pub use ranking::{report_score, RankedBackend};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Default error-rate cutoff for [`Registry::healthy_backends`].
pub const DEFAULT_HEALTH_THRESHOLD: f64 = 0.3;

/// A descriptor and its performance record share one map entry, so a backend
/// can never exist without exactly one record.
#[derive(Debug, Clone)]
struct BackendEntry {
    /// Registration order, kept across overwrites
    seq: u64,
    descriptor: BackendDescriptor,
    performance: PerformanceRecord,
}

/// The Backend Registry stores all known backends.
///
/// # Examples
///
/// ```
/// use switchyard::registry::{BackendDescriptor, Registry};
///
/// let registry = Registry::new();
/// registry.register_backend(BackendDescriptor::new("a", "Backend A", "openai", "gpt-vision"));
/// registry.record_outcome("a", true, 120);
///
/// let perf = registry.performance("a").unwrap();
/// assert_eq!(perf.total_requests, 1);
/// assert_eq!(registry.backend_count(), 1);
/// ```
pub struct Registry {
    backends: DashMap<String, BackendEntry>,
    next_seq: AtomicU64,
    /// Backend most recently pinned as the active one
    current: RwLock<Option<String>>,
}

impl Registry {
    /// Create a new empty Registry.
    pub fn new() -> Self {
        Self {
            backends: DashMap::new(),
            next_seq: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    fn current_read(&self) -> RwLockReadGuard<'_, Option<String>> {
        self.current.read().unwrap_or_else(|poisoned| {
            tracing::warn!("current backend lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn current_write(&self) -> RwLockWriteGuard<'_, Option<String>> {
        self.current.write().unwrap_or_else(|poisoned| {
            tracing::warn!("current backend lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Clear the current pin if it points at `id`.
    fn unpin(&self, id: &str) {
        let mut current = self.current_write();
        if current.as_deref() == Some(id) {
            tracing::info!(backend_id = %id, "Cleared current backend pin");
            *current = None;
        }
    }

    /// Insert or overwrite a backend.
    ///
    /// Overwriting replaces the descriptor but keeps the existing performance
    /// record. Registering a disabled descriptor over the pinned current
    /// backend clears the pin.
    pub fn register_backend(&self, descriptor: BackendDescriptor) {
        let id = descriptor.id.clone();
        let enabled = descriptor.enabled;

        match self.backends.entry(id.clone()) {
            Entry::Occupied(mut occupied) => {
                tracing::warn!(backend_id = %id, "Backend already registered, overwriting descriptor");
                occupied.get_mut().descriptor = descriptor;
                if !enabled {
                    self.unpin(&id);
                }
            }
            Entry::Vacant(vacant) => {
                let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
                vacant.insert(BackendEntry {
                    seq,
                    descriptor,
                    performance: PerformanceRecord::new(),
                });
                tracing::debug!(backend_id = %id, "Registered backend");
            }
        }
    }

    /// Register several backends in order.
    pub fn register_backends(&self, descriptors: impl IntoIterator<Item = BackendDescriptor>) {
        for descriptor in descriptors {
            self.register_backend(descriptor);
        }
    }

    /// Remove a backend together with its performance record.
    ///
    /// Returns `false` (and logs a warning) if the id is unknown.
    pub fn unregister_backend(&self, id: &str) -> bool {
        if self.backends.remove(id).is_none() {
            tracing::warn!(backend_id = %id, "Cannot unregister unknown backend");
            return false;
        }
        self.unpin(id);
        tracing::info!(backend_id = %id, "Unregistered backend");
        true
    }

    /// Get a copy of a backend descriptor by id.
    pub fn get_backend(&self, id: &str) -> Option<BackendDescriptor> {
        self.backends.get(id).map(|entry| entry.descriptor.clone())
    }

    /// Get a copy of a backend's performance record.
    pub fn performance(&self, id: &str) -> Option<PerformanceRecord> {
        self.backends.get(id).map(|entry| entry.performance.clone())
    }

    /// Snapshot of every entry in registration order.
    fn entries(&self) -> Vec<BackendEntry> {
        let mut entries: Vec<BackendEntry> = self
            .backends
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by_key(|entry| entry.seq);
        entries
    }

    /// Descriptors and records of enabled backends, in registration order.
    ///
    /// This is the raw candidate pool the selector filters further.
    pub fn enabled_with_performance(&self) -> Vec<(BackendDescriptor, PerformanceRecord)> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.descriptor.enabled)
            .map(|entry| (entry.descriptor, entry.performance))
            .collect()
    }

    /// Every performance record, keyed by backend id, in registration order.
    pub fn performance_snapshot(&self) -> Vec<(String, PerformanceRecord)> {
        self.entries()
            .into_iter()
            .map(|entry| (entry.descriptor.id, entry.performance))
            .collect()
    }

    /// All backends in registration order.
    pub fn list_all(&self) -> Vec<BackendDescriptor> {
        self.entries()
            .into_iter()
            .map(|entry| entry.descriptor)
            .collect()
    }

    /// Enabled backends in registration order.
    pub fn list_enabled(&self) -> Vec<BackendDescriptor> {
        self.list_all()
            .into_iter()
            .filter(|backend| backend.enabled)
            .collect()
    }

    /// Enabled backends sorted by ascending priority number (most preferred first).
    pub fn list_by_priority(&self) -> Vec<BackendDescriptor> {
        let mut backends = self.list_enabled();
        backends.sort_by_key(|backend| backend.priority);
        backends
    }

    /// Get the number of registered backends.
    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Enable or disable a backend.
    ///
    /// Disabling the pinned current backend clears the pin. Returns `false`
    /// if the id is unknown.
    pub fn set_enabled(&self, id: &str, enabled: bool) -> bool {
        let Some(mut entry) = self.backends.get_mut(id) else {
            tracing::warn!(backend_id = %id, "Cannot toggle unknown backend");
            return false;
        };
        entry.descriptor.enabled = enabled;
        if !enabled {
            self.unpin(id);
        }
        tracing::info!(backend_id = %id, enabled, "Backend enablement changed");
        true
    }

    /// Pin a backend as the current one.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::BackendNotFound` for unknown ids and
    /// `RegistryError::BackendDisabled` for disabled backends.
    pub fn set_current(&self, id: &str) -> Result<(), RegistryError> {
        let entry = self
            .backends
            .get(id)
            .ok_or_else(|| RegistryError::BackendNotFound(id.to_string()))?;
        if !entry.descriptor.enabled {
            return Err(RegistryError::BackendDisabled(id.to_string()));
        }
        *self.current_write() = Some(id.to_string());
        Ok(())
    }

    /// Id of the pinned current backend, if any.
    pub fn current_backend_id(&self) -> Option<String> {
        self.current_read().clone()
    }

    /// Descriptor of the pinned current backend, if any.
    pub fn current_backend(&self) -> Option<BackendDescriptor> {
        let id = self.current_backend_id()?;
        self.get_backend(&id)
    }

    /// Record the outcome of one request against a backend.
    ///
    /// Updates counters, the moving-average latency and the error rate.
    /// Returns `false` (and logs a warning) if the id is unknown.
    pub fn record_outcome(&self, id: &str, success: bool, latency_ms: u64) -> bool {
        let Some(mut entry) = self.backends.get_mut(id) else {
            tracing::warn!(backend_id = %id, "Cannot record outcome for unknown backend");
            return false;
        };
        entry.performance.record(success, latency_ms);
        tracing::debug!(
            backend_id = %id,
            success,
            latency_ms,
            error_rate = entry.performance.error_rate,
            "Recorded backend outcome"
        );
        true
    }

    /// Enabled backends ranked for reporting, best first.
    ///
    /// Uses [`report_score`], which is not the routing scorer.
    pub fn ranked_best(&self) -> Vec<RankedBackend> {
        let ranked = self
            .enabled_with_performance()
            .into_iter()
            .map(|(backend, performance)| {
                let score = report_score(&backend, &performance);
                RankedBackend {
                    backend,
                    performance,
                    score,
                }
            })
            .collect();
        ranking::rank(ranked)
    }

    /// Top entry of [`Registry::ranked_best`].
    pub fn best_backend(&self) -> Option<BackendDescriptor> {
        self.ranked_best()
            .into_iter()
            .next()
            .map(|ranked| ranked.backend)
    }

    /// Enabled backends with no history or an error rate below `error_threshold`.
    pub fn healthy_backends(&self, error_threshold: f64) -> Vec<BackendDescriptor> {
        self.enabled_with_performance()
            .into_iter()
            .filter(|(_, performance)| {
                !performance.has_history() || performance.error_rate < error_threshold
            })
            .map(|(backend, _)| backend)
            .collect()
    }

    /// Zero one backend's record, or every record when `id` is `None`.
    ///
    /// Returns `false` if a specific id was given and is unknown.
    pub fn reset_performance(&self, id: Option<&str>) -> bool {
        match id {
            Some(id) => {
                let Some(mut entry) = self.backends.get_mut(id) else {
                    tracing::warn!(backend_id = %id, "Cannot reset performance of unknown backend");
                    return false;
                };
                entry.performance.reset();
                tracing::info!(backend_id = %id, "Reset backend performance");
            }
            None => {
                for mut entry in self.backends.iter_mut() {
                    entry.performance.reset();
                }
                tracing::info!("Reset performance of all backends");
            }
        }
        true
    }

    /// Remove every backend and clear the current pin.
    pub fn clear(&self) {
        self.backends.clear();
        *self.current_write() = None;
        tracing::info!("Cleared backend registry");
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
