//! Error types for routing failures

use thiserror::Error;

/// Errors that can occur during backend selection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// Filtering left no backend to choose from
    #[error("No backend satisfies requirements ({requirements})")]
    NoCandidates { requirements: String },
}
