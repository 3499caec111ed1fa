//! Backend configuration

use serde::{Deserialize, Serialize};

use crate::registry::{BackendDescriptor, BackendLimits, Capabilities};

/// One `[[backends]]` entry.
///
/// Secrets are never stored in the file; `api_key_env` names the environment
/// variable holding the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub id: String,
    pub name: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub model_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub capabilities: Capabilities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<BackendLimits>,
}

fn default_priority() -> i32 {
    5
}

fn default_enabled() -> bool {
    true
}

impl BackendConfig {
    /// Build the registry descriptor, resolving the API key from the
    /// environment.
    pub fn to_descriptor(&self) -> BackendDescriptor {
        let mut descriptor = BackendDescriptor::new(
            self.id.clone(),
            self.name.clone(),
            self.provider.clone(),
            self.model_name.clone(),
        )
        .with_priority(self.priority)
        .with_capabilities(self.capabilities);

        descriptor.enabled = self.enabled;
        descriptor.base_url = self.base_url.clone();
        descriptor.limits = self.limits;

        if let Some(var) = &self.api_key_env {
            match std::env::var(var) {
                Ok(key) if !key.is_empty() => descriptor.api_key = Some(key),
                _ => tracing::warn!(
                    backend_id = %self.id,
                    env = %var,
                    "API key environment variable not set"
                ),
            }
        }

        descriptor
    }
}
