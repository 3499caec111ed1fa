//! Per-request task requirements

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which quality the caller cares about most. Adjusts scoring weights only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Speed,
    Accuracy,
    #[default]
    Balanced,
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "speed" => Ok(TaskPriority::Speed),
            "accuracy" => Ok(TaskPriority::Accuracy),
            "balanced" => Ok(TaskPriority::Balanced),
            _ => Err(format!("Unknown task priority: {}", s)),
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPriority::Speed => write!(f, "speed"),
            TaskPriority::Accuracy => write!(f, "accuracy"),
            TaskPriority::Balanced => write!(f, "balanced"),
        }
    }
}

/// Requirements supplied by the caller for one selection.
///
/// `requires_vision` and `requires_reasoning` are hard filters.
/// `max_latency_ms` only drops backends that already have history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TaskRequirements {
    pub requires_vision: bool,
    pub requires_reasoning: bool,
    pub max_latency_ms: Option<u64>,
    pub priority: TaskPriority,
}

impl TaskRequirements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vision(mut self) -> Self {
        self.requires_vision = true;
        self
    }

    pub fn with_reasoning(mut self) -> Self {
        self.requires_reasoning = true;
        self
    }

    pub fn with_max_latency_ms(mut self, max_latency_ms: u64) -> Self {
        self.max_latency_ms = Some(max_latency_ms);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Canonical key for the selection cache. Equal requirements always
    /// produce the same key.
    pub fn cache_key(&self) -> String {
        let max_latency = self
            .max_latency_ms
            .map(|ms| ms.to_string())
            .unwrap_or_else(|| "none".to_string());
        format!(
            "vision={};reasoning={};max_latency_ms={};priority={}",
            self.requires_vision, self.requires_reasoning, max_latency, self.priority
        )
    }
}
