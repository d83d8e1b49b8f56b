//! Rule file model and loading.
//!
//! # Example YAML
//!
//! ```yaml
//! program: deploy
//! leading_pattern: "--"
//! rules:
//!   - keys: [target, t]
//!     kind: required
//!     description: Deployment target
//!   - keys: [level]
//!     kind: optional
//!     default: "3"
//!   - keys: [help, h]
//!     kind: help
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use argline_core::{
    ConsoleOutputFormatter, DEFAULT_HELP_DESCRIPTION, DEFAULT_LEADING_PATTERN, Parser, Rule,
    RuleKind, RuleSet, RulesOutputFormatter, Token,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Serialization format of a rule file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Json,
    Yaml,
}

impl RuleFormat {
    /// Picks the format from a file extension (`json`, `yaml`, or `yml`).
    ///
    /// # Examples
    ///
    /// ```
    /// use argline_config::RuleFormat;
    ///
    /// assert_eq!(RuleFormat::from_path("rules.YML").unwrap(), RuleFormat::Yaml);
    /// assert!(RuleFormat::from_path("rules.toml").is_err());
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

fn default_kind() -> RuleKind {
    RuleKind::Optional
}

fn default_leading_pattern() -> String {
    DEFAULT_LEADING_PATTERN.to_string()
}

/// One rule entry in a rule file.
///
/// `kind` defaults to `optional`. Only optional rules may set `default`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Keys and aliases; the first is the primary key.
    pub keys: Vec<String>,
    #[serde(default = "default_kind")]
    pub kind: RuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RuleConfig {
    /// Builds the validated [`Rule`] this entry describes.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidRule`] if a required or help entry sets
    /// `default`; [`ConfigError::Argument`] if the keys are rejected.
    pub fn to_rule(&self) -> Result<Rule> {
        let rule = match (self.kind, &self.default) {
            (RuleKind::Required, None) => Rule::required(&self.keys)?,
            (RuleKind::Help, None) => Rule::help(&self.keys)?,
            (RuleKind::Optional, None) => Rule::optional(&self.keys)?,
            (RuleKind::Optional, Some(default)) => {
                Rule::optional_with_default(&self.keys, default.as_str())?
            }
            (kind, Some(_)) => {
                return Err(ConfigError::InvalidRule(format!(
                    "{kind:?} rule [{}] cannot carry a default value",
                    self.keys.join(", ")
                )));
            }
        };

        Ok(match &self.description {
            Some(description) => rule.with_description(description.as_str()),
            None => rule,
        })
    }
}

impl From<&Rule> for RuleConfig {
    fn from(rule: &Rule) -> Self {
        let description = rule
            .description()
            .filter(|desc| !(rule.is_help() && *desc == DEFAULT_HELP_DESCRIPTION))
            .map(str::to_string);
        Self {
            keys: rule.keys().to_vec(),
            kind: rule.kind(),
            default: rule.default_value().map(str::to_string),
            description,
        }
    }
}

/// Top-level rule file.
///
/// # Examples
///
/// ```
/// use argline_config::RulesConfig;
///
/// let config = RulesConfig::from_json_str(
///     r#"{"leading_pattern": "/", "rules": [{"keys": ["v", "verbose"]}]}"#,
/// )
/// .unwrap();
/// let parser = config.parser(["/verbose"]).unwrap();
/// assert!(parser.is_set("v"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Program name shown on the usage line; the executable name if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    /// Prefix that marks a token as a key.
    #[serde(default = "default_leading_pattern")]
    pub leading_pattern: String,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            program: None,
            leading_pattern: default_leading_pattern(),
            rules: Vec::new(),
        }
    }
}

impl RulesConfig {
    /// Describes an existing rule set.
    pub fn from_rule_set(rules: &RuleSet, leading_pattern: &str) -> Self {
        Self {
            program: None,
            leading_pattern: leading_pattern.to_string(),
            rules: rules.iter().map(RuleConfig::from).collect(),
        }
    }

    /// Loads a rule file, choosing the format from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedFormat`](ConfigError::UnsupportedFormat) for an
    /// unknown extension, [`IoError`](ConfigError::IoError) if the file
    /// cannot be read, or a JSON/YAML error if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = RuleFormat::from_path(path)?;
        let reader = BufReader::new(std::fs::File::open(path)?);
        let config: Self = match format {
            RuleFormat::Json => serde_json::from_reader(reader)?,
            RuleFormat::Yaml => serde_yaml::from_reader(reader)?,
        };
        debug!(
            path = %path.display(),
            ?format,
            rules = config.rules.len(),
            "loaded rule file"
        );
        Ok(config)
    }

    /// Saves the rule file in the format its extension names.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = RuleFormat::from_path(path)?;
        let writer = BufWriter::new(std::fs::File::create(path)?);
        match format {
            RuleFormat::Json => serde_json::to_writer_pretty(writer, self)?,
            RuleFormat::Yaml => serde_yaml::to_writer(writer, self)?,
        }
        Ok(())
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Builds the validated rule set. Keys must be unique across all rules.
    pub fn rule_set(&self) -> Result<RuleSet> {
        let mut set = RuleSet::new();
        for entry in &self.rules {
            set.add(entry.to_rule()?)?;
        }
        Ok(set)
    }

    /// Parses `tokens` with this file's rules and leading pattern.
    pub fn parser<I>(&self, tokens: I) -> Result<Parser>
    where
        I: IntoIterator,
        I::Item: Token,
    {
        let rules = self.rule_set()?;
        Ok(Parser::with_options(tokens, rules, &self.leading_pattern)?)
    }

    /// Renders the help screen for this file's rules.
    pub fn help_text(&self) -> Result<String> {
        let rules = self.rule_set()?;
        let mut formatter = ConsoleOutputFormatter::new(&rules, &self.leading_pattern);
        if let Some(program) = &self.program {
            formatter = formatter.with_program_name(program.as_str());
        }
        Ok(formatter.render()?)
    }
}
