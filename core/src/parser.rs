//! Token parsing, alias resolution, and re-serialization.
//!
//! A [`Parser`] is built from raw tokens in one step: the tokens are split
//! into key/value pairs, then every required rule is checked. Construction
//! either yields a fully validated parser or an error.
//!
//! # Tokenization
//!
//! Tokens are read left to right with one token of lookahead:
//!
//! - a token starting with the leading pattern (default `--`) is a key;
//! - a key followed by a token that is not a key takes it as its value;
//! - any other key is a valueless flag;
//! - a non-key token with no key before it becomes a valueless flag named
//!   after its own text.
//!
//! Keys are lower-cased and trimmed; values are kept verbatim. When a key
//! repeats, the last value wins and the key keeps its first position.

use std::any::type_name;
use std::borrow::Cow;
use std::ffi::OsString;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::convert::ArgValue;
use crate::error::{ArgumentError, Result};
use crate::rule::{Rule, RuleKind, fold_key};
use crate::rules::RuleSet;

/// Prefix that marks a token as a key when none is configured.
pub const DEFAULT_LEADING_PATTERN: &str = "--";

/// Something that can appear in a token list.
///
/// `None` entries are skipped by the tokenizer.
pub trait Token {
    /// The token text, or `None` to skip this entry.
    fn as_token(&self) -> Option<&str>;
}

impl Token for str {
    fn as_token(&self) -> Option<&str> {
        Some(self)
    }
}

impl Token for String {
    fn as_token(&self) -> Option<&str> {
        Some(self)
    }
}

impl Token for Cow<'_, str> {
    fn as_token(&self) -> Option<&str> {
        Some(self)
    }
}

impl<T: Token + ?Sized> Token for &T {
    fn as_token(&self) -> Option<&str> {
        (**self).as_token()
    }
}

impl<T: Token> Token for Option<T> {
    fn as_token(&self) -> Option<&str> {
        self.as_ref().and_then(Token::as_token)
    }
}

/// Parsed, validated command line.
///
/// # Examples
///
/// ```
/// use argline_core::{Parser, Rule, RuleSet};
///
/// let rules = RuleSet::try_from(vec![
///     Rule::optional(["a"]).unwrap(),
///     Rule::help(["help", "h"]).unwrap(),
/// ])
/// .unwrap();
///
/// let parser = Parser::with_rules(["--a", "b", "--help"], rules).unwrap();
/// assert_eq!(parser.get("a"), Some("b"));
/// assert!(parser.is_help());
/// assert!(parser.is_set("h"));
/// assert_eq!(parser.to_string(), "--a b --help");
/// ```
#[derive(Debug)]
pub struct Parser {
    leading_pattern: Arc<str>,
    parsed: IndexMap<String, Option<String>>,
    rules: Arc<RuleSet>,
}

impl Parser {
    /// Parses `tokens` with no rules and the default leading pattern.
    pub fn new<I>(tokens: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Token,
    {
        Self::with_options(tokens, RuleSet::new(), DEFAULT_LEADING_PATTERN)
    }

    /// Parses `tokens` against `rules` with the default leading pattern.
    pub fn with_rules<I>(tokens: I, rules: impl Into<Arc<RuleSet>>) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Token,
    {
        Self::with_options(tokens, rules, DEFAULT_LEADING_PATTERN)
    }

    /// Parses `tokens` against `rules`, treating tokens that start with
    /// `leading_pattern` as keys.
    ///
    /// # Errors
    ///
    /// [`ArgumentError::EmptyLeadingPattern`] if `leading_pattern` is empty,
    /// [`ArgumentError::MissingRequiredArgument`] if a required rule has none
    /// of its keys in `tokens`.
    ///
    /// # Examples
    ///
    /// ```
    /// use argline_core::{ArgumentError, Parser, Rule, RuleSet};
    ///
    /// let rules = RuleSet::try_from(vec![
    ///     Rule::required(["a"]).unwrap(),
    ///     Rule::required(["b"]).unwrap(),
    /// ])
    /// .unwrap();
    ///
    /// let err = Parser::with_options(["-a"], rules, "-").unwrap_err();
    /// assert_eq!(err, ArgumentError::MissingRequiredArgument { keys: vec!["b".into()] });
    /// ```
    pub fn with_options<I>(
        tokens: I,
        rules: impl Into<Arc<RuleSet>>,
        leading_pattern: &str,
    ) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Token,
    {
        if leading_pattern.is_empty() {
            return Err(ArgumentError::EmptyLeadingPattern);
        }
        let tokens: Vec<I::Item> = tokens.into_iter().collect();
        Self::build(&tokens, rules.into(), Arc::from(leading_pattern))
    }

    /// Parses the current process arguments, skipping the program name.
    ///
    /// Arguments that are not valid UTF-8 are converted lossily.
    pub fn from_env(rules: impl Into<Arc<RuleSet>>) -> Result<Self> {
        Self::from_os_args(std::env::args_os().skip(1), rules)
    }

    fn from_os_args<I>(args: I, rules: impl Into<Arc<RuleSet>>) -> Result<Self>
    where
        I: IntoIterator<Item = OsString>,
    {
        let tokens = args.into_iter().map(|arg| match arg.into_string() {
            Ok(arg) => arg,
            Err(arg) => {
                debug!(arg = ?arg, "argument is not valid UTF-8");
                arg.to_string_lossy().into_owned()
            }
        });
        Self::with_rules(tokens, rules)
    }

    /// Parses a single serialized line, as produced by this type's
    /// `Display` impl. See [`split_line`] for the quoting rules.
    ///
    /// # Examples
    ///
    /// ```
    /// use argline_core::{Parser, RuleSet};
    ///
    /// let original = Parser::new(["--c", "Hello World", "--flag"]).unwrap();
    /// let line = original.to_string();
    /// assert_eq!(line, "--c \"Hello World\" --flag");
    ///
    /// let reparsed = Parser::from_line(&line, RuleSet::new(), "--").unwrap();
    /// assert_eq!(reparsed.get("c"), Some("Hello World"));
    /// ```
    pub fn from_line(
        line: &str,
        rules: impl Into<Arc<RuleSet>>,
        leading_pattern: &str,
    ) -> Result<Self> {
        Self::with_options(split_line(line), rules, leading_pattern)
    }

    fn build<T: Token>(
        tokens: &[T],
        rules: Arc<RuleSet>,
        leading_pattern: Arc<str>,
    ) -> Result<Self> {
        let mut parser = Self {
            leading_pattern,
            parsed: IndexMap::new(),
            rules,
        };
        parser.parse(tokens);
        parser.validate()?;
        Ok(parser)
    }

    fn is_key(&self, token: &str) -> bool {
        token.starts_with(&*self.leading_pattern)
    }

    fn parse<T: Token>(&mut self, tokens: &[T]) {
        let mut i = 0;
        while i < tokens.len() {
            let Some(token) = tokens[i].as_token() else {
                i += 1;
                continue;
            };

            let (key, value) = match token.strip_prefix(&*self.leading_pattern) {
                Some(key) => match tokens.get(i + 1).and_then(|next| next.as_token()) {
                    Some(next) if !self.is_key(next) => {
                        i += 1;
                        (key, Some(next))
                    }
                    _ => (key, None),
                },
                None => {
                    debug!(token, "bare token stored as a valueless key");
                    (token, None)
                }
            };

            self.parsed.insert(fold_key(key), value.map(str::to_string));
            i += 1;
        }

        debug!(
            arguments = self.parsed.len(),
            leading_pattern = &*self.leading_pattern,
            "parsed command line"
        );
    }

    fn validate(&self) -> Result<()> {
        for rule in self.rules.of_kind(RuleKind::Required) {
            if !rule.keys().iter().any(|key| self.parsed.contains_key(key)) {
                debug!(keys = ?rule.keys(), "required argument missing");
                return Err(ArgumentError::MissingRequiredArgument {
                    keys: rule.keys().to_vec(),
                });
            }
        }
        Ok(())
    }

    /// Maps `candidate` to the key actually stored for it.
    ///
    /// If a rule declares `candidate`, the first of that rule's keys present
    /// on the command line is used; otherwise the normalized candidate.
    fn resolve_key(&self, candidate: &str) -> String {
        let key = fold_key(candidate);
        self.rules
            .find(&key)
            .and_then(|rule| {
                rule.keys()
                    .iter()
                    .find(|alias| self.parsed.contains_key(alias.as_str()))
            })
            .cloned()
            .unwrap_or(key)
    }

    /// `Some(value)` if the key (or an alias) was supplied, where `value` is
    /// `None` for a bare flag.
    fn supplied(&self, key: &str) -> Option<Option<&str>> {
        self.parsed
            .get(&self.resolve_key(key))
            .map(|value| value.as_deref())
    }

    /// Returns the value for `key`, resolving aliases.
    ///
    /// A supplied key returns its value (`None` for a bare flag). An absent
    /// key falls back to its rule's default value, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self.supplied(key) {
            Some(value) => value,
            None => self.rules.find(key).and_then(Rule::default_value),
        }
    }

    /// Returns the value for `key`, or `default` if the key was never
    /// supplied. `default` takes precedence over a rule's default value but
    /// never over a supplied key, even a bare flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use argline_core::Parser;
    ///
    /// let parser = Parser::new(["--a"]).unwrap();
    /// assert_eq!(parser.get_or("a", "nope"), None);
    /// assert_eq!(parser.get_or("b", "nope"), Some("nope"));
    /// ```
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> Option<&'a str> {
        match self.supplied(key) {
            Some(value) => value,
            None => Some(default),
        }
    }

    /// Returns the value for `key` converted to `T`.
    ///
    /// Missing values and values that do not convert both yield
    /// `T::default()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use argline_core::Parser;
    ///
    /// let parser = Parser::new(["--a", "12.34", "--b", "x"]).unwrap();
    /// assert_eq!(parser.get_as::<f64>("a"), 12.34);
    /// assert_eq!(parser.get_as::<i32>("b"), 0);
    /// assert_eq!(parser.get_as::<i32>("c"), 0);
    /// ```
    pub fn get_as<T: ArgValue>(&self, key: &str) -> T {
        self.get(key)
            .map(|raw| convert(key, raw))
            .unwrap_or_default()
    }

    /// Returns the value for `key` converted to `T`, or `default` if the key
    /// has no value.
    ///
    /// A value that is present but does not convert yields `T::default()`,
    /// not `default`.
    pub fn get_as_or<T: ArgValue>(&self, key: &str, default: T) -> T {
        match self.supplied(key).flatten() {
            Some(raw) => convert(key, raw),
            None => default,
        }
    }

    /// Returns `true` if `key`, or any alias declared with it, was supplied.
    pub fn is_set(&self, key: &str) -> bool {
        self.parsed.contains_key(&self.resolve_key(key))
    }

    /// Returns `true` if any help rule's key was supplied.
    pub fn is_help(&self) -> bool {
        self.rules
            .of_kind(RuleKind::Help)
            .any(|rule| rule.keys().iter().any(|key| self.is_set(key)))
    }

    /// Removes `key` (resolved through its aliases) from the parsed table.
    ///
    /// Removing a key that is not set does nothing.
    pub fn remove(&mut self, key: &str) -> &mut Self {
        if !self.is_set(key) {
            return self;
        }
        let resolved = self.resolve_key(key);
        self.parsed.shift_remove(&resolved);
        self
    }

    /// Builds an independent parser by re-parsing this one's tokens with the
    /// same rules and leading pattern.
    ///
    /// # Errors
    ///
    /// Re-parsing runs validation again, so this fails with
    /// [`ArgumentError::MissingRequiredArgument`] if a required key was
    /// removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use argline_core::Parser;
    ///
    /// let parser = Parser::new(["--a", "b", "--e", "--c", "d"]).unwrap();
    /// let mut clone = parser.try_clone().unwrap();
    /// clone.remove("a");
    ///
    /// assert_eq!(parser.to_string(), "--a b --e --c d");
    /// assert_eq!(clone.to_string(), "--e --c d");
    /// ```
    pub fn try_clone(&self) -> Result<Self> {
        Self::build(
            &self.tokens(),
            Arc::clone(&self.rules),
            Arc::clone(&self.leading_pattern),
        )
    }

    /// Undecorated token form: each key with its leading pattern, followed by
    /// its value when it has a non-empty one.
    pub fn tokens(&self) -> Vec<String> {
        self.serialize(false)
            .into_iter()
            .map(Cow::into_owned)
            .collect()
    }

    fn serialize(&self, quote: bool) -> Vec<Cow<'_, str>> {
        let mut tokens = Vec::with_capacity(self.parsed.len() * 2);
        for (key, value) in &self.parsed {
            let key_token = Cow::Owned(format!("{}{key}", self.leading_pattern));
            tokens.push(if quote { quote_token(key_token) } else { key_token });

            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                let value = Cow::Borrowed(value);
                tokens.push(if quote { quote_token(value) } else { value });
            }
        }
        tokens
    }

    /// Supplied arguments in first-seen order.
    pub fn arguments(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.parsed
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    pub fn leading_pattern(&self) -> &str {
        &self.leading_pattern
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl fmt::Display for Parser {
    /// Space-joined tokens; tokens containing whitespace are double-quoted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize(true).join(" "))
    }
}

fn convert<T: ArgValue>(key: &str, raw: &str) -> T {
    T::parse_arg(raw).unwrap_or_else(|| {
        debug!(key, raw, target_type = type_name::<T>(), "value did not convert");
        T::default()
    })
}

fn quote_token(token: Cow<'_, str>) -> Cow<'_, str> {
    if !token.chars().any(char::is_whitespace) && !token.starts_with('"') {
        return token;
    }
    let mut quoted = String::with_capacity(token.len() + 2);
    quoted.push('"');
    for ch in token.chars() {
        if matches!(ch, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

/// Splits a serialized command line into tokens.
///
/// Tokens are separated by whitespace. A token that starts with `"` runs to
/// the next unescaped `"`, and inside it `\"` and `\\` stand for `"` and `\`.
/// An unterminated quote takes the rest of the line. Other tokens are taken
/// literally.
///
/// # Examples
///
/// ```
/// use argline_core::split_line;
///
/// assert_eq!(
///     split_line(r#"--a b --c "Hello World" --q "say \"hi\"""#),
///     vec!["--a", "b", "--c", "Hello World", "--q", "say \"hi\""]
/// );
/// ```
pub fn split_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|ch| ch.is_whitespace()).is_some() {}
        let Some(&first) = chars.peek() else {
            break;
        };

        let mut token = String::new();
        if first == '"' {
            chars.next();
            while let Some(ch) = chars.next() {
                match ch {
                    '"' => break,
                    '\\' => match chars.peek() {
                        Some(&escaped) if escaped == '"' || escaped == '\\' => {
                            token.push(escaped);
                            chars.next();
                        }
                        _ => token.push('\\'),
                    },
                    _ => token.push(ch),
                }
            }
        } else {
            while let Some(ch) = chars.next_if(|ch| !ch.is_whitespace()) {
                token.push(ch);
            }
        }
        tokens.push(token);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(parser: &Parser) -> Vec<(String, Option<String>)> {
        parser
            .arguments()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_key_followed_by_value() {
        let parser = Parser::new(["--a", "b"]).unwrap();
        assert_eq!(parser.get("a"), Some("b"));
        assert!(parser.is_set("a"));
        assert!(!parser.is_set("b"));
    }

    #[test]
    fn test_consecutive_keys_are_flags() {
        let parser = Parser::new(["--a", "--b", "--c", "hello"]).unwrap();
        assert_eq!(
            table(&parser),
            vec![
                ("a".to_string(), None),
                ("b".to_string(), None),
                ("c".to_string(), Some("hello".to_string())),
            ]
        );
    }

    #[test]
    fn test_keys_are_normalized_values_are_not() {
        let parser = Parser::new(["--  NaMe ", " Mixed Case "]).unwrap();
        assert_eq!(parser.get("name"), Some(" Mixed Case "));
        assert_eq!(parser.get("NAME"), Some(" Mixed Case "));
    }

    #[test]
    fn test_last_occurrence_wins_and_keeps_position() {
        let parser = Parser::new(["--a", "1", "--b", "--A", "2"]).unwrap();
        assert_eq!(parser.get("a"), Some("2"));
        assert_eq!(parser.to_string(), "--a 2 --b");
    }

    #[test]
    fn test_bare_token_becomes_valueless_key() {
        let parser = Parser::new(["Stray", "--a", "b", "c"]).unwrap();
        assert_eq!(
            table(&parser),
            vec![
                ("stray".to_string(), None),
                ("a".to_string(), Some("b".to_string())),
                ("c".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_none_tokens_are_skipped() {
        let parser = Parser::new([Some("--a"), None, Some("b"), None]).unwrap();
        assert_eq!(parser.get("a"), None);
        assert!(parser.is_set("b"));
        assert_eq!(parser.arguments().count(), 2);
    }

    #[test]
    fn test_custom_leading_pattern() {
        let parser = Parser::with_options(["-a", "-b", "world"], RuleSet::new(), "-").unwrap();
        assert!(parser.is_set("a"));
        assert_eq!(parser.get_or("b", "nope"), Some("world"));
        assert_eq!(parser.to_string(), "-a -b world");
    }

    #[test]
    fn test_empty_leading_pattern_is_rejected() {
        let err = Parser::with_options(["a"], RuleSet::new(), "").unwrap_err();
        assert_eq!(err, ArgumentError::EmptyLeadingPattern);
    }

    #[test]
    fn test_empty_value_is_not_serialized() {
        let parser = Parser::new(["--a", "", "--b"]).unwrap();
        assert_eq!(parser.get("a"), Some(""));
        assert_eq!(parser.to_string(), "--a --b");
    }

    #[test]
    fn test_quote_token_escapes() {
        assert_eq!(quote_token(Cow::Borrowed("plain")), "plain");
        assert_eq!(quote_token(Cow::Borrowed("a b")), "\"a b\"");
        assert_eq!(
            quote_token(Cow::Borrowed("say \"hi\"")),
            "\"say \\\"hi\\\"\""
        );
        assert_eq!(quote_token(Cow::Borrowed("\"x")), "\"\\\"x\"");
    }

    #[test]
    fn test_split_line_unterminated_quote_takes_rest() {
        assert_eq!(split_line("--a \"b c"), vec!["--a", "b c"]);
        assert_eq!(split_line("   "), Vec::<String>::new());
        assert_eq!(split_line("--a \"\""), vec!["--a", ""]);
    }

    #[test]
    fn test_display_round_trips_through_from_line() {
        let parser = Parser::new([
            "Odd Key",
            "--a",
            "b",
            "--c",
            "Hello World",
            "--q",
            "say \"hi\" \\ now",
            "--flag",
        ])
        .unwrap();

        let reparsed = Parser::from_line(&parser.to_string(), RuleSet::new(), "--").unwrap();
        assert_eq!(table(&reparsed), table(&parser));
    }

    #[test]
    fn test_remove_keeps_remaining_order() {
        let mut parser = Parser::new(["--a", "1", "--b", "2", "--c", "3"]).unwrap();
        parser.remove("b").remove("zzz");
        assert_eq!(parser.to_string(), "--a 1 --c 3");
    }

    #[test]
    fn test_from_env_parses_process_arguments() {
        assert!(Parser::from_env(RuleSet::new()).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_argument_is_converted_lossily() {
        use std::os::unix::ffi::OsStringExt;

        let args = vec![OsString::from("--a"), OsString::from_vec(vec![b'x', 0xff])];
        let parser = Parser::from_os_args(args, RuleSet::new()).unwrap();
        assert_eq!(parser.get("a"), Some("x\u{FFFD}"));
    }
}
