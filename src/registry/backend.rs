use serde::{Deserialize, Serialize};

/// Relative response speed advertised by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeedTier {
    Fast,
    #[default]
    Medium,
    Slow,
}

/// Relative answer quality advertised by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyTier {
    High,
    #[default]
    Medium,
    Low,
}

impl std::fmt::Display for SpeedTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeedTier::Fast => write!(f, "fast"),
            SpeedTier::Medium => write!(f, "medium"),
            SpeedTier::Slow => write!(f, "slow"),
        }
    }
}

impl std::fmt::Display for AccuracyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccuracyTier::High => write!(f, "high"),
            AccuracyTier::Medium => write!(f, "medium"),
            AccuracyTier::Low => write!(f, "low"),
        }
    }
}

/// What a backend can do. `vision` and `reasoning` are hard filters during
/// selection; the tiers only adjust the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Capabilities {
    /// Accepts image inputs
    pub vision: bool,
    /// Suitable for multi-step reasoning tasks
    pub reasoning: bool,
    pub speed: SpeedTier,
    pub accuracy: AccuracyTier,
}

/// Advisory limits for a backend.
///
/// Only `timeout_ms` is enforced by the router; the other fields are passed
/// through for the caller's benefit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BackendLimits {
    pub max_tokens: Option<u32>,
    pub rate_limit_per_minute: Option<u32>,
    /// Per-attempt execution timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

/// Static description of a remote model backend.
///
/// Connection fields (`base_url`, `api_key`, `model_name`) are opaque to the
/// router and handed to the caller's work closure untouched.
///
/// # Examples
///
/// ```
/// use switchyard::registry::{BackendDescriptor, Capabilities, SpeedTier, AccuracyTier};
///
/// let backend = BackendDescriptor::new("vision-a", "Vision A", "openai", "gpt-vision")
///     .with_priority(1)
///     .with_capabilities(Capabilities {
///         vision: true,
///         reasoning: false,
///         speed: SpeedTier::Fast,
///         accuracy: AccuracyTier::Medium,
///     });
/// assert_eq!(backend.priority, 1);
/// assert!(backend.enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendDescriptor {
    /// Unique identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Provider label (e.g. "openai", "anthropic", "ollama")
    pub provider: String,
    pub base_url: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model_name: String,
    /// Routing preference (lower = prefer)
    pub priority: i32,
    pub enabled: bool,
    pub capabilities: Capabilities,
    pub limits: Option<BackendLimits>,
}

impl BackendDescriptor {
    /// Create an enabled backend with default capabilities and priority 5.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        provider: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            provider: provider.into(),
            base_url: None,
            api_key: None,
            model_name: model_name.into(),
            priority: 5,
            enabled: true,
            capabilities: Capabilities::default(),
            limits: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_limits(mut self, limits: BackendLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Mark the backend as disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Configured per-attempt timeout, if any.
    pub fn timeout_ms(&self) -> Option<u64> {
        self.limits.and_then(|limits| limits.timeout_ms)
    }
}
