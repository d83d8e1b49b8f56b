//! Error types for rule construction and argument parsing.
//!
//! Every failure is reported through [`ArgumentError`]. Callers that only care
//! about the broad category can match on [`ArgumentError::kind`].

use thiserror::Error;

/// Broad error category.
///
/// # Examples
///
/// ```
/// use argline_core::{ErrorKind, Rule};
///
/// let err = Rule::required(["   "]).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::InvalidArgument);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A key, key list, or leading pattern was malformed.
    InvalidArgument,
    /// A required rule had none of its keys on the command line.
    MissingRequiredArgument,
}

/// Errors raised while building rules or parsing arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// Key is empty or whitespace-only after normalization.
    #[error("key cannot be empty: {given:?}")]
    EmptyKey { given: String },
    /// A rule was declared without any key.
    #[error("a rule must declare at least one key")]
    NoKeys,
    /// The same normalized key appears twice, within one rule or across a set.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    /// The leading pattern that marks key tokens is empty.
    #[error("leading pattern cannot be empty")]
    EmptyLeadingPattern,
    /// Validation found a required rule with none of its keys present.
    #[error("missing required argument: {}", keys.join(", "))]
    MissingRequiredArgument { keys: Vec<String> },
}

impl ArgumentError {
    /// Returns the broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingRequiredArgument { .. } => ErrorKind::MissingRequiredArgument,
            Self::EmptyKey { .. }
            | Self::NoKeys
            | Self::DuplicateKey(_)
            | Self::EmptyLeadingPattern => ErrorKind::InvalidArgument,
        }
    }
}

/// Convenience alias for results with [`ArgumentError`].
pub type Result<T> = std::result::Result<T, ArgumentError>;
