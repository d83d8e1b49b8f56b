//! Rule definitions: one logical argument with its keys and constraints.
//!
//! A [`Rule`] is immutable once built. Its kind ([`RuleKind`]) fixes whether
//! the argument is required, optional, or a help request, and the
//! constructors validate keys for that kind up front.

use serde::{Deserialize, Serialize};

use crate::error::{ArgumentError, Result};

/// Description given to help rules when none is supplied.
pub const DEFAULT_HELP_DESCRIPTION: &str = "Display the help message";

/// What a rule means to the parser.
///
/// # Examples
///
/// ```
/// use argline_core::{Rule, RuleKind};
///
/// let rule = Rule::help(["help", "h"]).unwrap();
/// assert_eq!(rule.kind(), RuleKind::Help);
/// assert!(!rule.is_required());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// At least one key must be present or parsing fails.
    Required,
    /// May be absent; can carry a default value.
    Optional,
    /// Signals that the caller asked for the help screen.
    Help,
}

/// Normalizes a key: lower-cased, then trimmed.
///
/// Fails with [`ArgumentError::EmptyKey`] when nothing is left.
///
/// # Examples
///
/// ```
/// use argline_core::normalize_key;
///
/// assert_eq!(normalize_key("  Verbose ").unwrap(), "verbose");
/// assert!(normalize_key("   ").is_err());
/// ```
pub fn normalize_key(key: &str) -> Result<String> {
    let normalized = fold_key(key);
    if normalized.is_empty() {
        return Err(ArgumentError::EmptyKey {
            given: key.to_string(),
        });
    }
    Ok(normalized)
}

/// Lower-cases and trims without rejecting empty results.
///
/// The tokenizer uses this form so that a bare leading pattern still lands in
/// the table.
pub(crate) fn fold_key(key: &str) -> String {
    key.to_lowercase().trim().to_string()
}

/// A declared argument: one or more equivalent keys plus its constraints.
///
/// Use [`required`](Rule::required), [`optional`](Rule::optional),
/// [`optional_with_default`](Rule::optional_with_default), or
/// [`help`](Rule::help) to build one, then chain
/// [`with_description`](Rule::with_description).
///
/// # Examples
///
/// ```
/// use argline_core::Rule;
///
/// let level = Rule::optional_with_default(["Level", "l"], "3")
///     .unwrap()
///     .with_description("Compression level");
/// assert_eq!(level.keys(), ["level", "l"]);
/// assert_eq!(level.default_value(), Some("3"));
/// assert!(level.is_key_or_alias(" L "));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    keys: Vec<String>,
    kind: RuleKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl Rule {
    fn build<I, S>(keys: I, kind: RuleKind, default_value: Option<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for key in keys {
            let key = normalize_key(key.as_ref())?;
            if normalized.contains(&key) {
                return Err(ArgumentError::DuplicateKey(key));
            }
            normalized.push(key);
        }
        if normalized.is_empty() {
            return Err(ArgumentError::NoKeys);
        }

        Ok(Self {
            keys: normalized,
            kind,
            default_value,
            description: None,
        })
    }

    /// Creates a required rule. Required rules never carry a default.
    ///
    /// # Examples
    ///
    /// ```
    /// use argline_core::{ArgumentError, Rule};
    ///
    /// let rule = Rule::required(["input", "i"]).unwrap();
    /// assert!(rule.is_required());
    /// assert_eq!(rule.default_value(), None);
    ///
    /// assert_eq!(
    ///     Rule::required(["a", " A"]).unwrap_err(),
    ///     ArgumentError::DuplicateKey("a".into())
    /// );
    /// ```
    pub fn required<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(keys, RuleKind::Required, None)
    }

    /// Creates an optional rule without a default value.
    pub fn optional<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(keys, RuleKind::Optional, None)
    }

    /// Creates an optional rule whose value is assumed when the key is absent.
    pub fn optional_with_default<I, S>(keys: I, default_value: impl Into<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(keys, RuleKind::Optional, Some(default_value.into()))
    }

    /// Creates a help rule, described as [`DEFAULT_HELP_DESCRIPTION`].
    pub fn help<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::build(keys, RuleKind::Help, None)?.with_description(DEFAULT_HELP_DESCRIPTION))
    }

    /// Sets the human-readable description shown on the help screen.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Normalized keys in declaration order; the first is the primary key.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.kind == RuleKind::Required
    }

    pub fn is_help(&self) -> bool {
        self.kind == RuleKind::Help
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns `true` if `candidate` normalizes to one of this rule's keys.
    ///
    /// A candidate that normalizes to nothing matches no rule.
    pub fn is_key_or_alias(&self, candidate: &str) -> bool {
        let candidate = fold_key(candidate);
        self.keys.iter().any(|key| *key == candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_lower_cased_and_trimmed() {
        for (given, expected) in [
            ("Test", "test"),
            ("T", "t"),
            ("TEST", "test"),
            ("teST", "test"),
            ("test   ", "test"),
            ("   test   ", "test"),
            ("     test", "test"),
        ] {
            let rule = Rule::optional([given]).unwrap();
            assert_eq!(rule.keys(), [expected]);
        }
    }

    #[test]
    fn test_normalize_key_is_idempotent() {
        for key in ["Hello", "  MiXeD case ", "x", "ÄBC", "--Flag"] {
            let once = normalize_key(key).unwrap();
            assert_eq!(normalize_key(&once).unwrap(), once);
        }
    }

    #[test]
    fn test_empty_keys_are_rejected() {
        for given in ["", "   ", "\t"] {
            assert_eq!(
                Rule::required([given]).unwrap_err(),
                ArgumentError::EmptyKey {
                    given: given.to_string()
                }
            );
        }
    }

    #[test]
    fn test_empty_key_list_is_rejected() {
        let keys: [&str; 0] = [];
        assert_eq!(Rule::optional(keys).unwrap_err(), ArgumentError::NoKeys);
    }

    #[test]
    fn test_duplicate_keys_after_normalization_are_rejected() {
        assert_eq!(
            Rule::help(["help", "HELP "]).unwrap_err(),
            ArgumentError::DuplicateKey("help".to_string())
        );
    }

    #[test]
    fn test_optional_defaults() {
        let rule = Rule::optional(["key"]).unwrap();
        assert!(!rule.is_required());
        assert_eq!(rule.default_value(), None);
        assert_eq!(rule.description(), None);

        let rule = Rule::optional_with_default(["key"], "value").unwrap();
        assert!(!rule.is_required());
        assert_eq!(rule.default_value(), Some("value"));
    }

    #[test]
    fn test_help_rule_has_default_description() {
        let rule = Rule::help(["h"]).unwrap();
        assert!(rule.is_help());
        assert_eq!(rule.default_value(), None);
        assert_eq!(rule.description(), Some(DEFAULT_HELP_DESCRIPTION));

        let rule = rule.with_description("Show usage");
        assert_eq!(rule.description(), Some("Show usage"));
    }

    #[test]
    fn test_is_key_or_alias() {
        let rule = Rule::required(["input", "i"]).unwrap();
        assert!(rule.is_key_or_alias("INPUT"));
        assert!(rule.is_key_or_alias(" i "));
        assert!(!rule.is_key_or_alias("output"));
        assert!(!rule.is_key_or_alias(""));
    }

    #[test]
    fn test_rule_serializes_kind_lowercase() {
        let rule = Rule::optional_with_default(["level"], "3").unwrap();
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["kind"], "optional");
        assert_eq!(json["default_value"], "3");
        assert!(json.get("description").is_none());
    }
}
