//! Behavior descriptors
//!
//! In config files a behavior is a table tagged by `kind`:
//!
//! ```toml
//! [[stack.behaviors]]
//! kind = "authorize"
//! role = "admin"
//! ```
//!
//! On the command line it is a short string: `log`, `memoize` or
//! `authorize:<role>`.

use crate::error::CallError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One wrapper to apply, with its configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Behavior {
    /// Pre/post call records
    Log,

    /// Role guard; `caller` overrides the context's caller role
    Authorize {
        role: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caller: Option<String>,
    },

    /// Result cache keyed on positional arguments
    Memoize,
}

impl Behavior {
    pub fn authorize(role: impl Into<String>) -> Self {
        Self::Authorize {
            role: role.into(),
            caller: None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Authorize { .. } => "authorize",
            Self::Memoize => "memoize",
        }
    }
}

impl FromStr for Behavior {
    type Err = CallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CallError::InvalidBehavior {
            spec: s.to_string(),
            reason: reason.to_string(),
        };

        let (kind, arg) = match s.trim().split_once(':') {
            Some((kind, arg)) => (kind, Some(arg)),
            None => (s.trim(), None),
        };

        match (kind, arg) {
            ("log", None) => Ok(Self::Log),
            ("memoize", None) => Ok(Self::Memoize),
            ("authorize", Some(role)) if !role.is_empty() => Ok(Self::authorize(role)),
            ("authorize", _) => Err(invalid("authorize needs a role, e.g. authorize:admin")),
            ("log" | "memoize", Some(_)) => Err(invalid("takes no argument")),
            _ => Err(invalid("unknown behavior")),
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authorize { role, .. } => write!(f, "authorize:{}", role),
            other => f.write_str(other.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_forms() {
        assert_eq!("log".parse::<Behavior>().unwrap(), Behavior::Log);
        assert_eq!(" memoize ".parse::<Behavior>().unwrap(), Behavior::Memoize);
        assert_eq!(
            "authorize:admin".parse::<Behavior>().unwrap(),
            Behavior::authorize("admin")
        );
    }

    #[test]
    fn rejects_bad_forms() {
        assert!("authorize".parse::<Behavior>().is_err());
        assert!("authorize:".parse::<Behavior>().is_err());
        assert!("log:loud".parse::<Behavior>().is_err());
        assert!(matches!(
            "retry".parse::<Behavior>(),
            Err(CallError::InvalidBehavior { spec, .. }) if spec == "retry"
        ));
    }

    #[test]
    fn display_matches_short_form() {
        assert_eq!(Behavior::authorize("ops").to_string(), "authorize:ops");
        assert_eq!(Behavior::Memoize.to_string(), "memoize");
    }

    #[test]
    fn deserializes_tagged_json() {
        let b: Behavior =
            serde_json::from_str(r#"{"kind":"authorize","role":"admin","caller":"root"}"#)
                .unwrap();
        assert_eq!(
            b,
            Behavior::Authorize {
                role: "admin".to_string(),
                caller: Some("root".to_string()),
            }
        );
    }
}
