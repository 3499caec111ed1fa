//! Config command handlers

use crate::cli::{ConfigInitArgs, ConfigValidateArgs};
use crate::config::RouterConfig;
use colored::Colorize;
use std::fs;

const EXAMPLE_CONFIG: &str = include_str!("../../switchyard.example.toml");

/// Handle `switchyard config init` command
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<String, Box<dyn std::error::Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        )
        .into());
    }

    fs::write(&args.output, EXAMPLE_CONFIG)?;

    Ok(format!(
        "{} Configuration file created: {}\n  Edit the [[backends]] entries to describe your endpoints.",
        "✓".green(),
        args.output.display()
    ))
}

/// Handle `switchyard config validate` command
///
/// Unlike the other commands, a missing file is an error here.
pub fn handle_config_validate(
    args: &ConfigValidateArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let config = RouterConfig::load(Some(args.config.as_path()))?.with_env_overrides();
    config.validate()?;

    let enabled = config.backends.iter().filter(|b| b.enabled).count();
    Ok(format!(
        "{} {} is valid ({} backends, {} enabled)",
        "✓".green(),
        args.config.display(),
        config.backends.len(),
        enabled
    ))
}
