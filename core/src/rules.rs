//! Ordered, duplicate-free collections of rules.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{ArgumentError, Result};
use crate::rule::{Rule, RuleKind, fold_key};

/// Insertion-ordered set of [`Rule`]s with globally unique keys.
///
/// No key (or alias) may appear in two rules. [`add`](RuleSet::add) rejects a
/// rule that would break this and leaves the set unchanged.
///
/// # Examples
///
/// ```
/// use argline_core::{ArgumentError, Rule, RuleSet};
///
/// let mut rules = RuleSet::new();
/// rules.add(Rule::required(["input", "i"]).unwrap()).unwrap();
/// rules.add(Rule::help(["help", "h"]).unwrap()).unwrap();
/// assert_eq!(rules.len(), 2);
///
/// let err = rules.add(Rule::optional(["I"]).unwrap()).unwrap_err();
/// assert_eq!(err, ArgumentError::DuplicateKey("i".into()));
/// assert_eq!(rules.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule, rolling it back if any key is now declared twice.
    pub fn add(&mut self, rule: Rule) -> Result<()> {
        self.rules.push(rule);
        if let Some(duplicate) = self.first_duplicate_key() {
            self.rules.pop();
            return Err(ArgumentError::DuplicateKey(duplicate));
        }
        Ok(())
    }

    /// Builder form of [`add`](RuleSet::add).
    ///
    /// # Examples
    ///
    /// ```
    /// use argline_core::{Rule, RuleSet};
    ///
    /// let rules = RuleSet::new()
    ///     .with_rule(Rule::optional(["a"]).unwrap())
    ///     .and_then(|r| r.with_rule(Rule::help(["help", "h"]).unwrap()))
    ///     .unwrap();
    /// assert_eq!(rules.len(), 2);
    /// ```
    pub fn with_rule(mut self, rule: Rule) -> Result<Self> {
        self.add(rule)?;
        Ok(self)
    }

    fn first_duplicate_key(&self) -> Option<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        self.rules
            .iter()
            .flat_map(|rule| rule.keys())
            .find(|key| !seen.insert(key.as_str()))
            .cloned()
    }

    /// Finds the rule declaring `key` (normalized before comparison).
    pub fn find(&self, key: &str) -> Option<&Rule> {
        let key = fold_key(key);
        self.rules
            .iter()
            .find(|rule| rule.keys().iter().any(|k| *k == key))
    }

    /// Rules of one kind, in insertion order.
    pub fn of_kind(&self, kind: RuleKind) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |rule| rule.kind() == kind)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl TryFrom<Vec<Rule>> for RuleSet {
    type Error = ArgumentError;

    fn try_from(rules: Vec<Rule>) -> Result<Self> {
        let mut set = RuleSet::new();
        for rule in rules {
            set.add(rule)?;
        }
        Ok(set)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RuleSet {
        RuleSet::try_from(vec![
            Rule::optional(["a"]).unwrap(),
            Rule::required(["b", "bee"]).unwrap(),
            Rule::help(["help", "h"]).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_find_by_any_alias() {
        let rules = sample();
        assert_eq!(rules.find("BEE").unwrap().keys(), ["b", "bee"]);
        assert_eq!(rules.find("h").unwrap().kind(), RuleKind::Help);
        assert!(rules.find("c").is_none());
    }

    #[test]
    fn test_duplicate_across_rules_is_rolled_back() {
        let mut rules = sample();
        let before = rules.clone();

        let err = rules
            .add(Rule::optional(["x", "help"]).unwrap())
            .unwrap_err();
        assert_eq!(err, ArgumentError::DuplicateKey("help".to_string()));
        assert_eq!(rules, before);
    }

    #[test]
    fn test_try_from_rejects_duplicates() {
        let err = RuleSet::try_from(vec![
            Rule::optional(["a"]).unwrap(),
            Rule::required(["A"]).unwrap(),
        ])
        .unwrap_err();
        assert_eq!(err, ArgumentError::DuplicateKey("a".to_string()));
    }

    #[test]
    fn test_keys_stay_unique_after_every_add() {
        let mut rules = RuleSet::new();
        for keys in [&["a", "b"][..], &["c"], &["b", "d"], &["e", "a"], &["f"]] {
            let _ = rules.add(Rule::optional(keys.iter().copied()).unwrap());
            let mut seen = HashSet::new();
            assert!(rules.iter().flat_map(Rule::keys).all(|k| seen.insert(k)));
        }
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn test_of_kind_preserves_order() {
        let rules = RuleSet::try_from(vec![
            Rule::optional(["x"]).unwrap(),
            Rule::required(["y"]).unwrap(),
            Rule::optional(["z"]).unwrap(),
        ])
        .unwrap();
        let optional: Vec<&str> = rules
            .of_kind(RuleKind::Optional)
            .map(|r| r.keys()[0].as_str())
            .collect();
        assert_eq!(optional, vec!["x", "z"]);
    }
}
