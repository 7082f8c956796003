//! Call records and the sinks they are written to
//!
//! A logged call produces two records: one before the inner unit runs and
//! one after it returns. Sinks decide where the records go.

use crate::callable::Kwargs;
use crate::config::schema::{LoggingConfig, SinkKind};
use crate::config::ConfigManager;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

/// One observability record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum CallRecord {
    /// Emitted before the inner unit runs
    #[serde(rename = "call.started")]
    Started {
        name: String,
        args: String,
        kwargs: Kwargs,
    },

    /// Emitted after the inner unit returned successfully
    #[serde(rename = "call.returned")]
    Returned { name: String, result: String },
}

impl CallRecord {
    pub fn started<A: Debug>(name: &str, args: &A, kwargs: &Kwargs) -> Self {
        Self::Started {
            name: name.to_string(),
            args: format!("{:?}", args),
            kwargs: kwargs.clone(),
        }
    }

    pub fn returned<R: Debug>(name: &str, result: &R) -> Self {
        Self::Returned {
            name: name.to_string(),
            result: format!("{:?}", result),
        }
    }

    /// Name of the unit the record belongs to
    pub fn name(&self) -> &str {
        match self {
            Self::Started { name, .. } | Self::Returned { name, .. } => name,
        }
    }
}

impl fmt::Display for CallRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { name, args, kwargs } => {
                write!(f, "{} called with args={}, kwargs={}", name, args, kwargs)
            }
            Self::Returned { name, result } => write!(f, "{} returned {}", name, result),
        }
    }
}

/// Destination for call records
///
/// Recording is synchronous and infallible from the caller's point of view;
/// a sink that can fail must swallow and report its own errors.
pub trait CallSink: Send + Sync {
    fn record(&self, record: &CallRecord);
}

/// Prints each record as a line on standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl CallSink for StdoutSink {
    fn record(&self, record: &CallRecord) {
        println!("{}", record);
    }
}

/// Forwards records to the `tracing` subscriber at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl CallSink for TracingSink {
    fn record(&self, record: &CallRecord) {
        info!(target: "callwrap::calls", unit = record.name(), "{}", record);
    }
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<CallRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn records(&self) -> Vec<CallRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records rendered in their text form
    pub fn lines(&self) -> Vec<String> {
        self.records().iter().map(ToString::to_string).collect()
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl CallSink for MemorySink {
    fn record(&self, record: &CallRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}

/// Appends records as JSON lines to a file
///
/// Write failures are reported with `warn!` and the record is dropped, so a
/// broken log file never fails the call being logged.
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

impl CallSink for JsonLinesSink {
    fn record(&self, record: &CallRecord) {
        let mut entry = match serde_json::to_value(record) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize call record: {}", e);
                return;
            }
        };
        if let Some(map) = entry.as_object_mut() {
            map.insert(
                "timestamp".to_string(),
                serde_json::Value::String(Utc::now().to_rfc3339()),
            );
        }

        let mut line = entry.to_string();
        line.push('\n');

        if let Err(e) = self.append(&line) {
            warn!("Failed to write call log {}: {}", self.path.display(), e);
        }
    }
}

/// Build the sink selected in the logging configuration
pub fn from_config(config: &LoggingConfig) -> Arc<dyn CallSink> {
    match config.sink {
        SinkKind::Stdout => Arc::new(StdoutSink),
        SinkKind::Tracing => Arc::new(TracingSink),
        SinkKind::File => {
            let path = config
                .path
                .clone()
                .unwrap_or_else(ConfigManager::call_log_path);
            Arc::new(JsonLinesSink::new(path))
        }
    }
}
