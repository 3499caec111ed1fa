//! CLI module for Switchyard
//!
//! Command-line interface definitions and handlers for inspecting a router
//! configuration offline.
//!
//! # Commands
//!
//! - `backends` - List or rank the configured backends
//! - `select` - Dry-run a routing decision
//! - `config` - Configuration utilities (init, validate)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Which backend would serve a vision task that favours speed?
//! switchyard select --vision --priority speed
//!
//! # Generate shell completions
//! switchyard completions bash > ~/.bash_completion.d/switchyard
//! ```

pub mod backends;
pub mod completions;
pub mod config;
pub mod output;
pub mod select;

pub use completions::handle_completions;
pub use config::{handle_config_init, handle_config_validate};

use crate::config::{ConfigError, RouterConfig};
use crate::routing::TaskPriority;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "switchyard.toml";

/// Switchyard - model backend router
#[derive(Parser, Debug)]
#[command(
    name = "switchyard",
    version,
    about = "Backend selection, retry and failover for remote model endpoints"
)]
pub struct Cli {
    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect configured backends
    #[command(subcommand)]
    Backends(BackendsCommands),
    /// Show which backend would be selected for a task
    Select(SelectArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Subcommand, Debug)]
pub enum BackendsCommands {
    /// List configured backends
    List(BackendsListArgs),
    /// Rank enabled backends for reporting
    Rank(BackendsRankArgs),
}

#[derive(Args, Debug)]
pub struct BackendsListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Only show enabled backends
    #[arg(long)]
    pub enabled: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct BackendsRankArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Require image input support
    #[arg(long)]
    pub vision: bool,

    /// Require reasoning support
    #[arg(long)]
    pub reasoning: bool,

    /// Drop backends whose average latency exceeds this
    #[arg(long)]
    pub max_latency_ms: Option<u64>,

    /// What to optimise for (speed, accuracy, balanced)
    #[arg(short, long, default_value = "balanced")]
    pub priority: TaskPriority,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
    /// Check a configuration file for errors
    Validate(ConfigValidateArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ConfigValidateArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load configuration with environment and CLI overrides.
///
/// A missing file yields the defaults (no backends).
pub fn load_config(path: &Path, log_level: Option<&str>) -> Result<RouterConfig, ConfigError> {
    let mut config = if path.exists() {
        RouterConfig::load(Some(path))?
    } else {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        RouterConfig::default()
    };

    config = config.with_env_overrides();

    if let Some(level) = log_level {
        config.logging.level = level.to_string();
    }

    config.validate()?;
    Ok(config)
}
