//! Help screen rendering for rule sets.
//!
//! The layout is a usage block (required rules, then optional, then help)
//! followed by a description block with one line per rule:
//!
//! ```text
//! Usage: deploy
//!                --target, --t
//!                [--level=<3>]
//!                [--help, --h]
//!
//! target, t  :Deployment target
//! level      :Compression level
//! help, h    :Display the help message
//! ```

use std::io::{self, Write};

use crate::parser::Parser;
use crate::rule::{Rule, RuleKind};
use crate::rules::RuleSet;

/// Program name used when the running executable cannot be determined.
pub const UNKNOWN_PROGRAM_NAME: &str = "<app>";

/// Renders a rule set for display.
pub trait RulesOutputFormatter {
    /// Writes the full help screen to `out`.
    fn write_to(&self, out: &mut dyn Write) -> io::Result<()>;

    /// Renders the help screen into a string.
    ///
    /// Fails with whatever error `write_to` reports.
    fn render(&self) -> io::Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Writes the help screen to standard output.
    fn print(&self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.write_to(&mut lock)
    }
}

/// Plain-text help formatter for terminals.
///
/// # Examples
///
/// ```
/// use argline_core::{ConsoleOutputFormatter, Rule, RuleSet, RulesOutputFormatter};
///
/// let rules = RuleSet::try_from(vec![
///     Rule::optional_with_default(["a"], "Default A").unwrap().with_description("Optional"),
///     Rule::required(["b"]).unwrap().with_description("Required"),
/// ])
/// .unwrap();
///
/// let help = ConsoleOutputFormatter::new(&rules, "--")
///     .with_program_name("app")
///     .render()
///     .unwrap();
/// assert_eq!(
///     help,
///     "Usage: app\n            --b\n            [--a=<Default A>]\n\na  :Optional\nb  :Required\n"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ConsoleOutputFormatter<'a> {
    rules: &'a RuleSet,
    leading_pattern: &'a str,
    program_name: String,
}

impl<'a> ConsoleOutputFormatter<'a> {
    pub fn new(rules: &'a RuleSet, leading_pattern: &'a str) -> Self {
        Self {
            rules,
            leading_pattern,
            program_name: current_program_name(),
        }
    }

    /// Uses the rules and leading pattern of an existing parser.
    pub fn from_parser(parser: &'a Parser) -> Self {
        Self::new(parser.rules(), parser.leading_pattern())
    }

    /// Overrides the program name shown on the usage line.
    pub fn with_program_name(mut self, name: impl Into<String>) -> Self {
        self.program_name = name.into();
        self
    }

    fn flatten_keys(&self, rule: &Rule, with_pattern: bool) -> String {
        let prefix = if with_pattern { self.leading_pattern } else { "" };
        rule.keys()
            .iter()
            .map(|key| format!("{prefix}{key}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn usage_entry(&self, rule: &Rule) -> String {
        let mut entry = self.flatten_keys(rule, true);
        if let Some(default) = rule.default_value() {
            entry = format!("{entry}=<{default}>");
        }
        if !rule.is_required() {
            entry = format!("[{entry}]");
        }
        entry
    }
}

impl RulesOutputFormatter for ConsoleOutputFormatter<'_> {
    fn write_to(&self, out: &mut dyn Write) -> io::Result<()> {
        let usage = format!("Usage: {}", self.program_name);
        writeln!(out, "{usage}")?;

        let indent = " ".repeat(usage.chars().count() + 2);
        for kind in [RuleKind::Required, RuleKind::Optional, RuleKind::Help] {
            for rule in self.rules.of_kind(kind) {
                writeln!(out, "{indent}{}", self.usage_entry(rule))?;
            }
        }
        writeln!(out)?;

        let key_lists: Vec<String> = self
            .rules
            .iter()
            .map(|rule| self.flatten_keys(rule, false))
            .collect();
        let width = key_lists
            .iter()
            .map(|keys| keys.chars().count())
            .max()
            .unwrap_or(0)
            + 2;

        for (rule, keys) in self.rules.iter().zip(&key_lists) {
            writeln!(
                out,
                "{keys:<width$}:{}",
                rule.description().unwrap_or_default()
            )?;
        }
        Ok(())
    }
}

fn current_program_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| UNKNOWN_PROGRAM_NAME.to_string())
}
