//! Configuration schema for callwrap
//!
//! Configuration is stored at `~/.config/callwrap/config.toml`

use crate::layer::{Behavior, Stack};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Where call records go
    pub logging: LoggingConfig,

    /// Caller identity bound into role guards
    pub identity: IdentityConfig,

    /// Default wrapper stack
    pub stack: StackConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Diagnostic log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Call record destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// One text line per record on stdout
    #[default]
    Stdout,
    /// `tracing` events at info level
    Tracing,
    /// JSON lines appended to a file
    File,
}

/// Call logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Sink for call records
    pub sink: SinkKind,

    /// File for the `file` sink (defaults to the state directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Caller identity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Role the caller holds
    pub role: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            role: "user".to_string(),
        }
    }
}

/// Default wrapper stack, innermost first
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    pub behaviors: Stack,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            behaviors: Stack::new().with(Behavior::Log).with(Behavior::Memoize),
        }
    }
}
