//! callwrap CLI entry point
//!
//! Dispatches to subcommands.

use callwrap::cli::args::{ConfigAction, ConfigArgs};
use callwrap::cli::{Cli, Commands};
use callwrap::config::{Config, ConfigManager};
use callwrap::error::{CallError, CallResult};
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> CallResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let loaded = config_manager.load();

    let log_format = loaded
        .as_ref()
        .map(|c| c.general.log_format.as_str())
        .unwrap_or("text");
    init_logging(cli.verbose, log_format);

    // A broken config file must not lock the user out of `config init --force`,
    // but `config set` must not save defaults over it
    let config = match loaded {
        Ok(config) => config,
        Err(e @ CallError::ConfigInvalid { .. }) if tolerates_broken_config(&cli.command) => {
            warn!("{}; using defaults", e);
            Config::default()
        }
        Err(e) => return Err(e),
    };
    debug!("Using config {}", config_manager.path().display());

    match cli.command {
        Commands::Run(args) => callwrap::cli::commands::run(args, &config),
        Commands::Units => {
            callwrap::cli::commands::units();
            Ok(())
        }
        Commands::Config(args) => {
            callwrap::cli::commands::config(args, &config_manager, &config)
        }
    }
}

fn tolerates_broken_config(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Config(ConfigArgs {
            action: None
                | Some(ConfigAction::Show | ConfigAction::Path | ConfigAction::Init { .. }),
        })
    )
}

/// Diagnostics go to stderr so stdout carries only call records and results
fn init_logging(verbose: u8, log_format: &str) {
    // 0 = warn, 1 = info, 2+ = debug; call records from TracingSink always pass
    let filter = match verbose {
        0 => EnvFilter::new("callwrap=warn,callwrap::calls=info"),
        1 => EnvFilter::new("callwrap=info"),
        _ => EnvFilter::new("callwrap=debug"),
    };

    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init();
    }
}
