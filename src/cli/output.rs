//! Output formatting helpers for CLI commands

use crate::registry::{BackendDescriptor, RankedBackend};
use crate::routing::SelectionResult;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// View model for backend display. Never carries the API key.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BackendView {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub model: String,
    pub priority: i32,
    pub enabled: bool,
    pub vision: bool,
    pub reasoning: bool,
    pub speed: String,
    pub accuracy: String,
    pub timeout_ms: Option<u64>,
}

impl From<&BackendDescriptor> for BackendView {
    fn from(backend: &BackendDescriptor) -> Self {
        Self {
            id: backend.id.clone(),
            name: backend.name.clone(),
            provider: backend.provider.clone(),
            model: backend.model_name.clone(),
            priority: backend.priority,
            enabled: backend.enabled,
            vision: backend.capabilities.vision,
            reasoning: backend.capabilities.reasoning,
            speed: backend.capabilities.speed.to_string(),
            accuracy: backend.capabilities.accuracy.to_string(),
            timeout_ms: backend.timeout_ms(),
        }
    }
}

/// View model for the reporting rank
#[derive(Debug, Clone, serde::Serialize)]
pub struct RankView {
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub score: f64,
    pub total_requests: u64,
    pub error_rate: f64,
    pub avg_latency_ms: f64,
}

impl RankView {
    pub fn from_ranked(rank: usize, ranked: &RankedBackend) -> Self {
        Self {
            rank,
            id: ranked.backend.id.clone(),
            name: ranked.backend.name.clone(),
            score: ranked.score,
            total_requests: ranked.performance.total_requests,
            error_rate: ranked.performance.error_rate,
            avg_latency_ms: ranked.performance.average_latency_ms,
        }
    }
}

/// View model for a dry-run selection
#[derive(Debug, Clone, serde::Serialize)]
pub struct SelectionView {
    pub backend: BackendView,
    pub score: f64,
    pub reason: String,
    pub alternatives: Vec<String>,
}

impl From<&SelectionResult> for SelectionView {
    fn from(result: &SelectionResult) -> Self {
        Self {
            backend: BackendView::from(&result.backend),
            score: result.score,
            reason: result.reason.clone(),
            alternatives: result.alternatives.iter().map(|b| b.id.clone()).collect(),
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

fn to_pretty_json(value: serde_json::Value) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&value)
}

/// Format backends as a table
pub fn format_backends_table(backends: &[BackendView]) -> String {
    let mut table = new_table(vec![
        "ID", "Name", "Provider", "Model", "Priority", "Status", "Vision", "Reasoning", "Speed",
        "Accuracy",
    ]);

    for b in backends {
        let status_str = if b.enabled {
            "Enabled".green().to_string()
        } else {
            "Disabled".red().to_string()
        };

        table.add_row(vec![
            Cell::new(&b.id),
            Cell::new(&b.name),
            Cell::new(&b.provider),
            Cell::new(&b.model),
            Cell::new(b.priority),
            Cell::new(status_str),
            Cell::new(yes_no(b.vision)),
            Cell::new(yes_no(b.reasoning)),
            Cell::new(&b.speed),
            Cell::new(&b.accuracy),
        ]);
    }

    table.to_string()
}

/// Format backends as JSON
pub fn format_backends_json(backends: &[BackendView]) -> Result<String, serde_json::Error> {
    to_pretty_json(json!({ "backends": backends }))
}

/// Format the reporting rank as a table
pub fn format_rank_table(ranks: &[RankView]) -> String {
    let mut table = new_table(vec!["#", "ID", "Name", "Score", "Requests", "Error Rate", "Latency"]);

    for r in ranks {
        let latency = if r.total_requests == 0 {
            "-".dimmed().to_string()
        } else {
            format!("{:.0}ms", r.avg_latency_ms)
        };

        table.add_row(vec![
            Cell::new(r.rank),
            Cell::new(&r.id),
            Cell::new(&r.name),
            Cell::new(format!("{:.1}", r.score)),
            Cell::new(r.total_requests),
            Cell::new(format!("{:.0}%", r.error_rate * 100.0)),
            Cell::new(latency),
        ]);
    }

    table.to_string()
}

/// Format the reporting rank as JSON
pub fn format_rank_json(ranks: &[RankView]) -> Result<String, serde_json::Error> {
    to_pretty_json(json!({ "ranking": ranks }))
}

/// Format a selection as human-readable lines
pub fn format_selection_text(selection: &SelectionView) -> String {
    let alternatives = if selection.alternatives.is_empty() {
        "none".to_string()
    } else {
        selection.alternatives.join(", ")
    };

    format!(
        "{} {} ({})\n  Score:        {:.1}\n  Reason:       {}\n  Alternatives: {}",
        "✓".green(),
        selection.backend.name.bold(),
        selection.backend.id,
        selection.score,
        selection.reason,
        alternatives
    )
}

/// Format a selection as JSON
pub fn format_selection_json(selection: &SelectionView) -> Result<String, serde_json::Error> {
    to_pretty_json(json!({ "selection": selection }))
}
