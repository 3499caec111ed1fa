//! Error types for execution failures

use crate::routing::RoutingError;
use thiserror::Error;

/// Why an attempt (and, for the last attempt, the whole call) failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    NoCandidates(#[from] RoutingError),

    #[error("Backend '{backend_id}' timed out after {timeout_ms}ms")]
    Timeout { backend_id: String, timeout_ms: u64 },

    /// The caller's work returned an error
    #[error("Backend '{backend_id}' failed: {message}")]
    Work { backend_id: String, message: String },
}

impl ExecutionError {
    /// Backend the failed attempt ran on, if one was selected.
    pub fn backend_id(&self) -> Option<&str> {
        match self {
            ExecutionError::NoCandidates(_) => None,
            ExecutionError::Timeout { backend_id, .. } | ExecutionError::Work { backend_id, .. } => {
                Some(backend_id)
            }
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecutionError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_backend() {
        let timeout = ExecutionError::Timeout {
            backend_id: "a".to_string(),
            timeout_ms: 500,
        };
        assert_eq!(timeout.to_string(), "Backend 'a' timed out after 500ms");
        assert_eq!(timeout.backend_id(), Some("a"));
        assert!(timeout.is_timeout());

        let no_candidates = ExecutionError::from(RoutingError::NoCandidates {
            requirements: "vision=true".to_string(),
        });
        assert!(no_candidates.backend_id().is_none());
        assert!(no_candidates.to_string().contains("vision=true"));
    }
}
