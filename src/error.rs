//! Error types for callwrap
//!
//! Every callable in the crate returns `CallResult<T>`. Wrappers never
//! recover from an error locally: whatever the inner unit returns is handed
//! back to the caller unchanged.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for callwrap operations
pub type CallResult<T> = Result<T, CallError>;

/// All errors that can occur while wrapping or invoking a callable
#[derive(Error, Debug)]
pub enum CallError {
    // Invocation errors
    #[error("Forbidden: {name} requires role '{required}', caller has role '{caller}'")]
    Forbidden {
        name: String,
        required: String,
        caller: String,
    },

    #[error("{name} failed: {reason}")]
    Failed { name: String, reason: String },

    #[error("Invalid arguments for {name}: {reason}")]
    InvalidArguments { name: String, reason: String },

    #[error("Recursive unit {0} is already bound to a wrapper")]
    AlreadyBound(String),

    #[error("Memo cache lock poisoned for {0}")]
    CachePoisoned(String),

    // Composition errors
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Invalid behavior '{spec}': {reason}")]
    InvalidBehavior { spec: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid value for {key}: {reason}")]
    ConfigValue { key: String, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl CallError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a unit failure, the error a wrapped computation raises itself
    pub fn failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-arguments error
    pub fn invalid_args(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error came from a role guard
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    /// Check if error is retryable
    ///
    /// Authorization failures are final for the call that raised them.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CachePoisoned(_))
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Forbidden { .. } => Some("Pass the required role with --as <role>"),
            Self::UnknownUnit(_) => Some("Run: callwrap units"),
            Self::InvalidBehavior { .. } => {
                Some("Behaviors are: log, memoize, authorize:<role>")
            }
            Self::ConfigInvalid { .. } => Some("Run: callwrap config init --force"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_display() {
        let err = CallError::Forbidden {
            name: "delete_user".to_string(),
            required: "admin".to_string(),
            caller: "user".to_string(),
        };
        assert!(err.to_string().starts_with("Forbidden"));
        assert!(err.to_string().contains("'admin'"));
        assert!(err.is_forbidden());
    }

    #[test]
    fn error_hint() {
        let err = CallError::UnknownUnit("nope".to_string());
        assert_eq!(err.hint(), Some("Run: callwrap units"));
        assert_eq!(CallError::failed("add", "boom").hint(), None);
    }

    #[test]
    fn forbidden_not_retryable() {
        let err = CallError::Forbidden {
            name: "f".to_string(),
            required: "a".to_string(),
            caller: "b".to_string(),
        };
        assert!(!err.is_retryable());
        assert!(CallError::CachePoisoned("fib".to_string()).is_retryable());
    }
}
