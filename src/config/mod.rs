//! Configuration module for Switchyard
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`SWITCHYARD_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use switchyard::config::RouterConfig;
//!
//! let toml = r#"
//! [retry]
//! max_retries = 5
//!
//! [[backends]]
//! id = "local"
//! name = "Local"
//! provider = "ollama"
//! model_name = "llava"
//! "#;
//! let config: RouterConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.retry.max_retries, 5);
//! assert_eq!(config.selection.cache_ttl_seconds, 60);
//! assert_eq!(config.backends[0].priority, 5);
//! ```

pub mod backend;
pub mod error;
pub mod logging;
pub mod retry;
pub mod selection;

pub use backend::BackendConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use retry::RetryConfig;
pub use selection::SelectionConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::manager::RetryPolicy;
use crate::registry::BackendDescriptor;
use crate::routing::SelectorConfig;

/// Complete router configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Selection cache and health settings
    pub selection: SelectionConfig,
    /// Attempt bound, back-off and timeouts
    pub retry: RetryConfig,
    pub logging: LoggingConfig,
    /// Backends registered at startup, in order
    pub backends: Vec<BackendConfig>,
}

impl RouterConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are ignored and the current value is kept.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `SWITCHYARD_*` overrides resolved through `lookup`.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(level) = lookup("SWITCHYARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("SWITCHYARD_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }
        if let Some(retries) = lookup("SWITCHYARD_MAX_RETRIES") {
            if let Ok(r) = retries.parse() {
                self.retry.max_retries = r;
            }
        }
        if let Some(ttl) = lookup("SWITCHYARD_CACHE_TTL_SECONDS") {
            if let Ok(t) = ttl.parse() {
                self.selection.cache_ttl_seconds = t;
            }
        }

        self
    }

    /// Validate configuration
    ///
    /// Duplicate backend ids are accepted; the later entry wins at
    /// registration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_retries == 0 {
            return Err(ConfigError::validation(
                "retry.max_retries",
                "at least one attempt is required",
            ));
        }

        let threshold = self.selection.health_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::validation(
                "selection.health_threshold",
                format!("must be between 0 and 1, got {}", threshold),
            ));
        }

        for (i, backend) in self.backends.iter().enumerate() {
            if backend.id.trim().is_empty() {
                return Err(ConfigError::validation(
                    format!("backends[{}].id", i),
                    "id cannot be empty",
                ));
            }
            if backend.name.trim().is_empty() {
                return Err(ConfigError::validation(
                    format!("backends[{}].name", i),
                    "name cannot be empty",
                ));
            }
        }

        Ok(())
    }

    pub fn selector_config(&self) -> SelectorConfig {
        (&self.selection).into()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        (&self.retry).into()
    }

    /// Descriptors for every configured backend, API keys resolved.
    pub fn descriptors(&self) -> Vec<BackendDescriptor> {
        self.backends.iter().map(BackendConfig::to_descriptor).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::CacheTtlMode;
    use std::collections::HashMap;
    use std::path::Path;

    fn backend(id: &str, name: &str) -> BackendConfig {
        BackendConfig {
            id: id.to_string(),
            name: name.to_string(),
            provider: "test".to_string(),
            base_url: None,
            model_name: "model".to_string(),
            api_key_env: None,
            priority: 1,
            enabled: true,
            capabilities: Default::default(),
            limits: None,
        }
    }

    #[test]
    fn test_router_config_defaults() {
        let config = RouterConfig::default();
        assert_eq!(config.selection.cache_ttl_seconds, 60);
        assert_eq!(config.selection.cache_ttl_mode, CacheTtlMode::SharedTimestamp);
        assert_eq!(config.retry.max_retries, 3);
        assert!(config.backends.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_parse_example_file() {
        let toml = include_str!("../../switchyard.example.toml");
        let config: RouterConfig = toml::from_str(toml).unwrap();
        assert!(!config.backends.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_from_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[retry]\nbase_delay_ms = 250").unwrap();

        let config = RouterConfig::load(Some(temp.path())).unwrap();
        assert_eq!(config.retry.base_delay_ms, 250);
        assert_eq!(config.retry.max_retries, 3);
    }

    #[test]
    fn test_config_missing_file_error() {
        let result = RouterConfig::load(Some(Path::new("/nonexistent/switchyard.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_config_parse_error() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[retry\nmax_retries = ").unwrap();

        let result = RouterConfig::load(Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_load_none_returns_defaults() {
        let config = RouterConfig::load(None).unwrap();
        assert_eq!(config, RouterConfig::default());
    }

    #[test]
    fn test_config_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SWITCHYARD_LOG_LEVEL", "debug"),
            ("SWITCHYARD_LOG_FORMAT", "json"),
            ("SWITCHYARD_MAX_RETRIES", "7"),
            ("SWITCHYARD_CACHE_TTL_SECONDS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let config = RouterConfig::default()
            .with_overrides_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.retry.max_retries, 7);
        // Invalid value keeps the default
        assert_eq!(config.selection.cache_ttl_seconds, 60);
    }

    #[test]
    fn test_config_overrides_absent_keep_file_values() {
        let config: RouterConfig = toml::from_str("[retry]\nmax_retries = 0\n").unwrap();
        let config = config.with_overrides_from(|_| None);

        assert_eq!(config.retry.max_retries, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_retries() {
        let mut config = RouterConfig::default();
        config.retry.max_retries = 0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "retry.max_retries"
        ));
    }

    #[test]
    fn test_config_validation_threshold_range() {
        let mut config = RouterConfig::default();
        config.selection.health_threshold = 1.5;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "selection.health_threshold"
        ));
    }

    #[test]
    fn test_config_validation_empty_backend_fields() {
        let mut config = RouterConfig::default();
        config.backends.push(backend(" ", "named"));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "backends[0].id"
        ));

        config.backends[0] = backend("a", "");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "backends[0].name"
        ));
    }

    #[test]
    fn test_config_duplicate_ids_allowed() {
        let mut config = RouterConfig::default();
        config.backends.push(backend("a", "first"));
        config.backends.push(backend("a", "second"));
        assert!(config.validate().is_ok());
        assert_eq!(config.descriptors().len(), 2);
    }
}
