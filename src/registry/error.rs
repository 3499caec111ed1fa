/// Errors that can occur during registry operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("backend not found: {0}")]
    BackendNotFound(String),

    #[error("backend is disabled: {0}")]
    BackendDisabled(String),
}
