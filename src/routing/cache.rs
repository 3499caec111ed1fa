//! Selection cache

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::Instant;

use super::SelectionResult;

/// Default freshness window for cached selections.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// How cache freshness is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CacheTtlMode {
    /// An entry is fresh while the most recent cache write of any key is
    /// younger than the TTL. A frequently used router can therefore serve an
    /// entry that is far older than the TTL.
    #[default]
    SharedTimestamp,
    /// Each entry expires TTL after its own write.
    PerEntry,
}

impl FromStr for CacheTtlMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shared_timestamp" => Ok(CacheTtlMode::SharedTimestamp),
            "per_entry" => Ok(CacheTtlMode::PerEntry),
            _ => Err(format!("Unknown cache TTL mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedSelection {
    result: SelectionResult,
    written_at: Instant,
}

/// Selection results keyed by [`TaskRequirements::cache_key`](super::TaskRequirements::cache_key).
#[derive(Debug)]
pub(crate) struct SelectionCache {
    ttl: Duration,
    mode: CacheTtlMode,
    entries: HashMap<String, CachedSelection>,
    last_write_at: Option<Instant>,
}

impl SelectionCache {
    pub(crate) fn new(ttl: Duration, mode: CacheTtlMode) -> Self {
        Self {
            ttl,
            mode,
            entries: HashMap::new(),
            last_write_at: None,
        }
    }

    /// Fresh entry for `key`, if any.
    pub(crate) fn get(&self, key: &str, now: Instant) -> Option<&SelectionResult> {
        let entry = self.entries.get(key)?;
        let stamped = match self.mode {
            CacheTtlMode::SharedTimestamp => self.last_write_at?,
            CacheTtlMode::PerEntry => entry.written_at,
        };
        (now.saturating_duration_since(stamped) < self.ttl).then_some(&entry.result)
    }

    /// Store `result` under `key`, first evicting entries that can no longer
    /// be served.
    pub(crate) fn insert(&mut self, key: String, result: SelectionResult, now: Instant) {
        self.evict_expired(now);
        self.entries.insert(
            key,
            CachedSelection {
                result,
                written_at: now,
            },
        );
        self.last_write_at = Some(now);
    }

    fn evict_expired(&mut self, now: Instant) {
        let ttl = self.ttl;
        match self.mode {
            CacheTtlMode::SharedTimestamp => {
                // Every entry shares the gate, so a stale gate means all are stale
                if let Some(last) = self.last_write_at {
                    if now.saturating_duration_since(last) >= ttl {
                        self.entries.clear();
                    }
                }
            }
            CacheTtlMode::PerEntry => {
                self.entries
                    .retain(|_, entry| now.saturating_duration_since(entry.written_at) < ttl);
            }
        }
    }

    pub(crate) fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
