//! Reporting rank for dashboards and CLI output.
//!
//! This ranking is deliberately separate from the routing scorer in
//! [`crate::routing::scoring`]. Backends without history get a flat baseline
//! that outranks every backend with history, which is fine for a listing but
//! must never drive request routing.

use serde::Serialize;

use super::{BackendDescriptor, PerformanceRecord};

/// Baseline for backends that have never been used.
pub const UNPROVEN_BASELINE: f64 = 1000.0;

/// Average latency at which the latency component reaches zero.
pub const LATENCY_SATURATION_MS: f64 = 5000.0;

const SUCCESS_WEIGHT: f64 = 60.0;
const LATENCY_WEIGHT: f64 = 30.0;
const PRIORITY_WEIGHT: f64 = 10.0;

/// A backend with its reporting score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBackend {
    pub backend: BackendDescriptor,
    pub performance: PerformanceRecord,
    pub score: f64,
}

/// Score a backend for reporting purposes. Higher is better.
///
/// With history the score is at most 100: success rate (60), a latency curve
/// that reaches zero at [`LATENCY_SATURATION_MS`] (30) and priority (10).
/// Without history it is `UNPROVEN_BASELINE - priority`.
pub fn report_score(backend: &BackendDescriptor, performance: &PerformanceRecord) -> f64 {
    let priority = backend.priority as f64;

    if !performance.has_history() {
        return UNPROVEN_BASELINE - priority;
    }

    let latency_score = (1.0 - performance.average_latency_ms / LATENCY_SATURATION_MS).max(0.0);
    let priority_score = ((10.0 - priority) / 10.0).clamp(0.0, 1.0);

    performance.success_rate() * SUCCESS_WEIGHT
        + latency_score * LATENCY_WEIGHT
        + priority_score * PRIORITY_WEIGHT
}

/// Sort descending by score. Ties keep their input order.
pub fn rank(mut entries: Vec<RankedBackend>) -> Vec<RankedBackend> {
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    entries
}
