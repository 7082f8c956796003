//! CLI argument definitions using clap derive

use crate::layer::Behavior;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// callwrap - compose logging, role guards and memoization around a unit
///
/// Runs built-in units through a stack of wrappers, innermost first.
#[derive(Parser, Debug)]
#[command(name = "callwrap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CALLWRAP_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Invoke a built-in unit through a wrapper stack
    Run(RunArgs),

    /// List built-in units
    Units,

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Unit to invoke (see `callwrap units`)
    pub unit: String,

    /// Positional integer arguments
    #[arg(allow_negative_numbers = true)]
    pub args: Vec<String>,

    /// Keyword argument (KEY=VALUE, value parsed as JSON when possible)
    #[arg(short, long = "kw", value_parser = parse_kwarg)]
    pub kwargs: Vec<(String, serde_json::Value)>,

    /// Wrapper stack, innermost first (e.g. log,memoize,authorize:admin)
    #[arg(short, long, value_delimiter = ',', conflicts_with = "bare")]
    pub stack: Vec<Behavior>,

    /// Run the unit with no wrappers, ignoring the configured stack
    #[arg(long)]
    pub bare: bool,

    /// Caller role bound into role guards (defaults to identity.role)
    #[arg(long = "as", value_name = "ROLE")]
    pub caller: Option<String>,

    /// Invoke the stack this many times with the same arguments
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., identity.role)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Parse a keyword argument in KEY=VALUE format
fn parse_kwarg(s: &str) -> Result<(String, serde_json::Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE format: no '=' found in '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty keyword name in '{s}'"));
    }
    let value = serde_json::from_str(raw)
        .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
