//! Structured outcome of a routed call

use super::error::ExecutionError;

/// Backend id reported when a call ends without success.
pub const UNKNOWN_BACKEND: &str = "unknown";

/// What `run_with_best_backend` resolved to. Always produced, never thrown.
#[derive(Debug)]
pub struct ExecutionResult<T> {
    /// The work's output, or the error of the last attempt
    pub outcome: Result<T, ExecutionError>,
    /// Backend that produced the output; [`UNKNOWN_BACKEND`] on failure
    pub backend_id: String,
    /// Duration of the successful attempt; 0 on failure
    pub latency_ms: u64,
    /// Failed attempts before the outcome
    pub retries: u32,
}

impl<T> ExecutionResult<T> {
    pub(crate) fn succeeded(data: T, backend_id: String, latency_ms: u64, retries: u32) -> Self {
        Self {
            outcome: Ok(data),
            backend_id,
            latency_ms,
            retries,
        }
    }

    pub(crate) fn failed(error: ExecutionError, retries: u32) -> Self {
        Self {
            outcome: Err(error),
            backend_id: UNKNOWN_BACKEND.to_string(),
            latency_ms: 0,
            retries,
        }
    }

    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Recovered after at least one failed attempt.
    pub fn degraded(&self) -> bool {
        self.success() && self.retries > 0
    }

    pub fn error(&self) -> Option<&ExecutionError> {
        self.outcome.as_ref().err()
    }

    pub fn into_outcome(self) -> Result<T, ExecutionError> {
        self.outcome
    }
}
