//! Measurement wrapper and metric names.
//!
//! Consumers install their own `metrics` recorder (see [`setup_metrics`] for
//! a Prometheus one); without a recorder installed, all metric calls are
//! no-ops.
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `switchyard_selections_total{outcome}` - Selections by outcome
//! - `switchyard_cache_hits_total` / `switchyard_cache_misses_total` - Selection cache
//! - `switchyard_failovers_total` - Failover attempts
//! - `switchyard_attempts_total{backend, status}` - Executed attempts
//! - `switchyard_retries_exhausted_total` - Calls that ran out of attempts
//!
//! **Histograms:**
//! - `switchyard_operation_duration_seconds{operation}` - Measured operations
//! - `switchyard_backend_latency_seconds{backend}` - Successful attempt latency

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Duration of measured operations. Labels: `operation`.
pub const OPERATION_DURATION_SECONDS: &str = "switchyard_operation_duration_seconds";

/// Selections performed. Labels: `outcome` ("selected" | "no_candidates").
pub const SELECTIONS_TOTAL: &str = "switchyard_selections_total";

pub const CACHE_HITS_TOTAL: &str = "switchyard_cache_hits_total";

pub const CACHE_MISSES_TOTAL: &str = "switchyard_cache_misses_total";

pub const FAILOVERS_TOTAL: &str = "switchyard_failovers_total";

/// Executed attempts. Labels: `backend`, `status` ("ok" | "error" | "timeout").
pub const ATTEMPTS_TOTAL: &str = "switchyard_attempts_total";

pub const RETRIES_EXHAUSTED_TOTAL: &str = "switchyard_retries_exhausted_total";

/// Latency of successful attempts. Labels: `backend`.
pub const BACKEND_LATENCY_SECONDS: &str = "switchyard_backend_latency_seconds";

fn record_duration(operation: &'static str, elapsed: Duration) {
    metrics::histogram!(OPERATION_DURATION_SECONDS, "operation" => operation)
        .record(elapsed.as_secs_f64());
    tracing::trace!(
        operation,
        elapsed_ms = elapsed.as_millis() as u64,
        "Measured operation"
    );
}

/// Await `future`, recording its duration under `operation`.
///
/// The output is returned untouched; errors are not inspected or swallowed.
pub async fn measure<F, T>(operation: &'static str, future: F) -> T
where
    F: Future<Output = T>,
{
    let start = Instant::now();
    let output = future.await;
    record_duration(operation, start.elapsed());
    output
}

/// Synchronous counterpart of [`measure`].
pub fn measure_sync<T>(operation: &'static str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let output = f();
    record_duration(operation, start.elapsed());
    output
}

/// Install a Prometheus recorder with latency buckets suited to remote model
/// calls (seconds).
///
/// Returns a handle that renders the text exposition format.
pub fn setup_metrics(
) -> Result<metrics_exporter_prometheus::PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

    let latency_buckets = &[
        0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0,
    ];
    let operation_buckets = &[
        0.0001, 0.0005, 0.001, 0.005, 0.01, 0.1, 1.0, 5.0, 30.0, 120.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(BACKEND_LATENCY_SECONDS.to_string()),
            latency_buckets,
        )?
        .set_buckets_for_metric(
            Matcher::Full(OPERATION_DURATION_SECONDS.to_string()),
            operation_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn measure_sync_returns_value_and_records() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        let value = metrics::with_local_recorder(&recorder, || {
            measure_sync("test.sync", || 41 + 1)
        });

        assert_eq!(value, 42);
        let rendered = handle.render();
        assert!(rendered.contains(OPERATION_DURATION_SECONDS));
        assert!(rendered.contains("test.sync"));
    }

    #[test]
    fn measure_sync_passes_errors_through() {
        let result: Result<(), String> = measure_sync("test.error", || Err("boom".to_string()));
        assert_eq!(result, Err("boom".to_string()));
    }

    #[test]
    fn setup_metrics_installs_global_recorder() {
        let handle = setup_metrics().expect("first install succeeds");
        metrics::counter!(FAILOVERS_TOTAL).increment(1);
        assert!(handle.render().contains(FAILOVERS_TOTAL));

        // Only one global recorder per process
        assert!(setup_metrics().is_err());
    }

    #[tokio::test]
    async fn measure_returns_future_output() {
        let result: Result<u32, &str> = measure("test.async", async { Ok(7) }).await;
        assert_eq!(result, Ok(7));

        let failed: Result<u32, &str> = measure("test.async", async { Err("nope") }).await;
        assert_eq!(failed, Err("nope"));
    }
}
