use anyhow::{anyhow, Context};
use clap::Parser;
use std::path::Path;
use switchyard::cli::{
    backends, handle_completions, handle_config_init, handle_config_validate, load_config, select,
    BackendsCommands, Cli, Commands, ConfigCommands,
};
use switchyard::manager::RoutingManager;

/// Load config, install logging and build a manager with the configured
/// backends.
fn build_manager(config_path: &Path, log_level: Option<&str>) -> anyhow::Result<RoutingManager> {
    let config = load_config(config_path, log_level)
        .with_context(|| format!("loading {}", config_path.display()))?;

    if let Err(e) = switchyard::logging::init_tracing(&config.logging) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    Ok(RoutingManager::from_config(&config))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let log_level = cli.log_level.as_deref();

    let output = match cli.command {
        Commands::Backends(cmd) => match cmd {
            BackendsCommands::List(args) => {
                let manager = build_manager(&args.config, log_level)?;
                backends::handle_backends_list(&args, &manager)
            }
            BackendsCommands::Rank(args) => {
                let manager = build_manager(&args.config, log_level)?;
                backends::handle_backends_rank(&args, &manager)
            }
        },
        Commands::Select(args) => {
            let manager = build_manager(&args.config, log_level)?;
            select::handle_select(&args, &manager)
        }
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
            ConfigCommands::Validate(args) => handle_config_validate(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args, &mut std::io::stdout());
            return Ok(());
        }
    };

    let output = output.map_err(|e| anyhow!("{}", e))?;
    println!("{}", output);
    Ok(())
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
