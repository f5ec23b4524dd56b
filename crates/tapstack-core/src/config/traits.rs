//! Configuration errors

use std::num::ParseIntError;
use std::path::PathBuf;

/// Errors that can occur while assembling or resolving configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A token in the extra egress port list is not a base-10 integer
    #[error("Invalid egress port '{token}': {source}")]
    InvalidPort {
        token: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Invalid context override '{0}': expected key=value")]
    InvalidContextOverride(String),

    #[error("Failed to read context file {path}: {message}")]
    ContextFile { path: PathBuf, message: String },

    #[error("Failed to read outputs file {path}: {message}")]
    Outputs { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Other(String),
}

impl ConfigError {
    pub fn context_file(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::ContextFile {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn outputs(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Outputs {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// The offending token, for port errors
    pub fn invalid_token(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidPort { token, .. } => Some(token),
            _ => None,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
