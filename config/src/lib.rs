//! Declarative rule files for argline parsers.
//!
//! A rule file lists the arguments a program accepts, in YAML or JSON, and
//! turns into a validated [`RuleSet`](argline_core::RuleSet) plus the leading
//! pattern and program name used for parsing and help output.
//!
//! # Quick start
//!
//! ```
//! use argline_config::RulesConfig;
//!
//! let config = RulesConfig::from_yaml_str(r#"
//! program: deploy
//! rules:
//!   - keys: [target, t]
//!     kind: required
//!     description: Deployment target
//!   - keys: [help, h]
//!     kind: help
//! "#).unwrap();
//!
//! let parser = config.parser(["--t", "prod"]).unwrap();
//! assert_eq!(parser.get("target"), Some("prod"));
//! ```

mod error;
mod rules_config;

pub use error::{ConfigError, Result};
pub use rules_config::{RuleConfig, RuleFormat, RulesConfig};
