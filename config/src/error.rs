//! Error types for rule file operations.
//!
//! Covers I/O, serialization in either supported format, and rule
//! definitions that do not describe a valid rule set.

use argline_core::ArgumentError;
use thiserror::Error;

/// Errors that can occur while loading or applying a rule file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// File extension is neither JSON nor YAML.
    #[error("unsupported rule file format: {0}")]
    UnsupportedFormat(String),

    /// A rule entry combines fields its kind does not allow.
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// Rule keys were rejected, or parsing against the rules failed.
    #[error(transparent)]
    Argument(#[from] ArgumentError),
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
