//! Core error model.

use thiserror::Error;

/// Result type used across the core layer.
pub type CoreResult<T> = Result<T, CoreError>;

/// Core-level error.
///
/// Covers malformed input handed to the library (logger names, settings).
/// I/O failures belong to the crates that perform I/O.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A logger name could not be turned into a path.
    #[error("invalid logger path: {0}")]
    InvalidPath(String),

    /// A configuration value was missing or out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CoreError {
    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
