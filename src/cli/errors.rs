//! CLI-specific error types
//!
//! Every CLI error is terminal: main prints it and exits non-zero.

use thiserror::Error;

use crate::config::ConfigError;
use crate::store::StoreError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be read or validated
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// stdin/stdout or socket failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invocation envelope could not be parsed or turned into a request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// JSON encoding/decoding failure on the invocation envelope
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Store bootstrap failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CliError {
    /// Invalid request envelope
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }
}
