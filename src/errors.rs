//! Error types
//!
//! Parsing and resource failures abort the current cluster and propagate to
//! the caller. Language model lookup misses never surface here; they are
//! absorbed by `<unk>` substitution during scoring.

use std::fmt;
use std::path::PathBuf;

/// Errors raised while loading resources or parsing input
#[derive(Debug)]
pub enum CompressionError {
    /// Malformed tagged token or model line
    Parse {
        /// Where the offending text came from (file name, "sentence 3", ...)
        origin: String,
        /// 1-based line number within `origin`, when meaningful
        line: Option<usize>,
        /// What was wrong
        message: String,
    },
    /// A stopword or model file could not be read
    Resource {
        /// Path of the resource
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },
    /// A configuration value is out of range
    InvalidConfig {
        /// JSON-pointer style path of the field
        path: String,
        /// What was wrong
        message: String,
    },
}

impl CompressionError {
    /// Build a parse error
    pub fn parse(origin: impl Into<String>, line: Option<usize>, message: impl Into<String>) -> Self {
        Self::Parse {
            origin: origin.into(),
            line,
            message: message.into(),
        }
    }

    /// Build a resource error for `path`
    pub fn resource(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Resource {
            path: path.into(),
            source,
        }
    }

    /// Build a configuration error
    pub fn invalid_config(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for CompressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionError::Parse {
                origin,
                line: Some(line),
                message,
            } => write!(f, "parse error in {} at line {}: {}", origin, line, message),
            CompressionError::Parse {
                origin,
                line: None,
                message,
            } => write!(f, "parse error in {}: {}", origin, message),
            CompressionError::Resource { path, source } => {
                write!(f, "cannot read resource {}: {}", path.display(), source)
            }
            CompressionError::InvalidConfig { path, message } => {
                write!(f, "invalid configuration at {}: {}", path, message)
            }
        }
    }
}

impl std::error::Error for CompressionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompressionError::Resource { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, CompressionError>;
