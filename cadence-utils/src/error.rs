//! Error types for cadence
//!
//! Provides a unified error type used across all cadence crates.

use std::path::PathBuf;

/// Main error type for cadence operations
#[derive(Debug, thiserror::Error)]
pub enum CadenceError {
    // === IO Errors ===

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Configuration Errors ===

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    #[error("Configuration lookup failed for [{key}]: {reason}")]
    ConfigLookup { key: String, reason: String },

    // === Internal Errors ===

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CadenceError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a config lookup error for a key path
    pub fn lookup(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLookup {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias using CadenceError
pub type Result<T> = std::result::Result<T, CadenceError>;
