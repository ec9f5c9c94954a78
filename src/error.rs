use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors surfaced by collection loading and parser construction.
///
/// Pattern mismatches and unparseable dates are not errors here; they
/// are normal outcomes carried on the records themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogError {
    /// A log file could not be opened or read
    Io {
        operation: String,
        path: String,
        message: String,
    },
    /// A custom line pattern was rejected
    Pattern {
        pattern: String,
        message: String,
    },
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::Io { operation, path, message } => {
                write!(f, "I/O error during {} of '{}': {}", operation, path, message)
            }
            LogError::Pattern { pattern, message } => {
                write!(f, "invalid line pattern '{}': {}", pattern, message)
            }
        }
    }
}

impl std::error::Error for LogError {}
