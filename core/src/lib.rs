//! Rule-driven command-line argument parsing.
//!
//! This crate turns a raw token list into a queryable key/value table:
//!
//! - [`Rule`] — one logical argument: its keys (aliases), whether it is
//!   required, optional, or a help request, and an optional default value.
//! - [`RuleSet`] — an ordered collection of rules with globally unique keys.
//! - [`Parser`] — tokenizes, validates required rules, resolves aliases, and
//!   re-serializes the table.
//! - [`ConsoleOutputFormatter`] — renders a rule set as a help screen.
//!
//! Typed lookups go through [`ArgValue`], which never fails loudly: values
//! that do not convert come back as the type's default.
//!
//! # Example
//!
//! ```
//! use argline_core::*;
//!
//! let rules = RuleSet::try_from(vec![
//!     Rule::required(["input", "i"]).unwrap().with_description("File to read"),
//!     Rule::optional_with_default(["level"], "3").unwrap(),
//!     Rule::help(["help", "h"]).unwrap(),
//! ])
//! .unwrap();
//!
//! let parser = Parser::with_rules(["--I", "data.csv", "--verbose"], rules).unwrap();
//!
//! assert_eq!(parser.get("input"), Some("data.csv"));
//! assert_eq!(parser.get_as::<u32>("level"), 3);
//! assert!(parser.is_set("verbose"));
//! assert!(!parser.is_help());
//! assert_eq!(parser.to_string(), "--i data.csv --verbose");
//! ```

mod convert;
mod error;
mod help;
mod parser;
mod rule;
mod rules;

pub use convert::ArgValue;
pub use error::{ArgumentError, ErrorKind, Result};
pub use help::{ConsoleOutputFormatter, RulesOutputFormatter, UNKNOWN_PROGRAM_NAME};
pub use parser::{DEFAULT_LEADING_PATTERN, Parser, Token, split_line};
pub use rule::{DEFAULT_HELP_DESCRIPTION, Rule, RuleKind, normalize_key};
pub use rules::RuleSet;
