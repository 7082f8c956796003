//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::schema::SinkKind;
use crate::config::{Config, ConfigManager};
use crate::error::{CallError, CallResult};
use crate::layer::Stack;
use console::style;
use std::path::PathBuf;

/// Execute the config command
pub fn execute(args: ConfigArgs, manager: &ConfigManager, config: &Config) -> CallResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force)?,
        Some(ConfigAction::Set { key, value }) => {
            let mut updated = config.clone();
            set_value(&mut updated, &key, &value)?;
            manager.save(&updated)?;
            println!("{} Set {} = {}", style("✓").green(), key, value);
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> CallResult<()> {
    let toml = toml::to_string_pretty(config)?;
    println!("{}", toml);
    Ok(())
}

fn init_config(manager: &ConfigManager, force: bool) -> CallResult<()> {
    let path = manager.path();

    if path.exists() && !force {
        println!(
            "{} Config already exists at {}",
            style("!").yellow(),
            path.display()
        );
        println!("  {}", style("Use --force to overwrite").dim());
        return Ok(());
    }

    manager.save(&Config::default())?;
    println!(
        "{} Configuration initialized {}",
        style("✓").green(),
        style(path.display()).dim()
    );
    Ok(())
}

fn set_value(config: &mut Config, key: &str, value: &str) -> CallResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => return Err(invalid(key, "expected 'text' or 'json'")),
        },
        ["logging", "sink"] => {
            config.logging.sink = match value {
                "stdout" => SinkKind::Stdout,
                "tracing" => SinkKind::Tracing,
                "file" => SinkKind::File,
                _ => return Err(invalid(key, "expected 'stdout', 'tracing' or 'file'")),
            }
        }
        ["logging", "path"] => config.logging.path = Some(PathBuf::from(value)),
        ["identity", "role"] => {
            if value.is_empty() {
                return Err(invalid(key, "role must not be empty"));
            }
            config.identity.role = value.to_string();
        }
        ["stack", "behaviors"] => config.stack.behaviors = value.parse::<Stack>()?,
        _ => {
            let reason = format!("unknown key, valid keys: {}", VALID_KEYS.join(", "));
            return Err(invalid(key, &reason));
        }
    }

    Ok(())
}

const VALID_KEYS: &[&str] = &[
    "general.log_format",
    "logging.sink",
    "logging.path",
    "identity.role",
    "stack.behaviors",
];

fn invalid(key: &str, reason: &str) -> CallError {
    CallError::ConfigValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
