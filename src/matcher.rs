//! Label matchers
//!
//! A matcher is a predicate over a single label: byte-exact equality or
//! inequality, or an anchored regular expression in the positive or
//! negative. A query is a conjunction of matchers, one aggregate lookup
//! per matcher (see [`crate::index`]).
//!
//! Regex patterns are compiled once at construction and fully anchored
//! (`^(?:pattern)$`), so `pod-0` matches the value `pod-0` and nothing
//! else. The indexes never introspect patterns; they only call
//! [`Matcher::matches`] or the raw pattern predicate.
//!
//! # Example
//!
//! ```rust
//! use cardinality_index::matcher::Matcher;
//!
//! let m = Matcher::regex("pod", "pod-[0-9]").unwrap();
//! assert!(m.matches("pod-7"));
//! assert!(!m.matches("pod-77"));
//! ```

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The comparison a matcher applies to a label value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchKind {
    /// Byte-exact equality with the pattern
    Equal,
    /// Byte-exact inequality with the pattern
    NotEqual,
    /// Anchored regex match
    Regex,
    /// Anchored regex non-match
    NotRegex,
}

/// A predicate over one label
#[derive(Debug, Clone)]
pub struct Matcher {
    name: String,
    kind: MatchKind,
    pattern: String,
    re: Option<Regex>,
}

impl Matcher {
    /// Create a matcher of the given kind
    ///
    /// For the regex kinds the pattern is compiled fully anchored;
    /// compilation failure is the only error this crate surfaces.
    pub fn new(kind: MatchKind, name: &str, pattern: &str) -> Result<Self> {
        let re = match kind {
            MatchKind::Regex | MatchKind::NotRegex => Some(
                Regex::new(&format!("^(?:{pattern})$")).map_err(|source| Error::InvalidRegex {
                    pattern: pattern.to_string(),
                    source,
                })?,
            ),
            MatchKind::Equal | MatchKind::NotEqual => None,
        };
        Ok(Self {
            name: name.to_string(),
            kind,
            pattern: pattern.to_string(),
            re,
        })
    }

    /// Equality matcher: `name = pattern`
    pub fn equal(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: MatchKind::Equal,
            pattern: pattern.to_string(),
            re: None,
        }
    }

    /// Inequality matcher: `name != pattern`
    pub fn not_equal(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: MatchKind::NotEqual,
            pattern: pattern.to_string(),
            re: None,
        }
    }

    /// Regex matcher: `name =~ pattern`
    pub fn regex(name: &str, pattern: &str) -> Result<Self> {
        Self::new(MatchKind::Regex, name, pattern)
    }

    /// Negated regex matcher: `name !~ pattern`
    pub fn not_regex(name: &str, pattern: &str) -> Result<Self> {
        Self::new(MatchKind::NotRegex, name, pattern)
    }

    /// The label name this matcher constrains
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The comparison kind
    pub fn kind(&self) -> MatchKind {
        self.kind
    }

    /// The raw pattern as supplied by the caller
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether the matcher accepts `value`
    ///
    /// `NotEqual` and `NotRegex` are negations: they accept every value
    /// their pattern does not.
    pub fn matches(&self, value: &str) -> bool {
        match self.kind {
            MatchKind::Equal => value == self.pattern,
            MatchKind::NotEqual => value != self.pattern,
            MatchKind::Regex => self.pattern_matches(value),
            MatchKind::NotRegex => !self.pattern_matches(value),
        }
    }

    /// Whether the anchored pattern itself matches `value`, before any
    /// negation the kind may apply. Equality kinds compare bytes.
    pub(crate) fn pattern_matches(&self, value: &str) -> bool {
        match &self.re {
            Some(re) => re.is_match(value),
            None => value == self.pattern,
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.kind {
            MatchKind::Equal => "=",
            MatchKind::NotEqual => "!=",
            MatchKind::Regex => "=~",
            MatchKind::NotRegex => "!~",
        };
        write!(f, "{}{}{:?}", self.name, op, self.pattern)
    }
}
