//! String-or-pattern match rules
//!
//! Selector denylists and file exclusion lists accept either a plain string,
//! which matches by substring containment, or a regular expression, which
//! matches anywhere in the haystack.
//!
//! In config files a pattern is written as a table:
//!
//! ```toml
//! excludeFiles = ["vendor/", { pattern = "\\.min\\.css$" }]
//! ```
//!
//! On the command line a pattern is written between slashes (`/\.min\.css$/`).

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single denylist or exclusion entry
#[derive(Debug, Clone)]
pub enum MatchRule {
    /// Matches when the haystack contains this text
    Literal(String),
    /// Matches when the regex finds a match in the haystack
    Pattern(Regex),
}

impl MatchRule {
    /// Create a literal (substring) rule
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Create a regex rule
    pub fn pattern(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self::Pattern)
    }

    /// Parse a command-line argument. `/.../` becomes a pattern, anything else
    /// is a literal.
    ///
    /// # Example
    ///
    /// ```
    /// use px2unit::pattern::MatchRule;
    ///
    /// assert!(matches!(MatchRule::from_arg("ignore").unwrap(), MatchRule::Literal(_)));
    /// assert!(matches!(MatchRule::from_arg("/^\\.no-/").unwrap(), MatchRule::Pattern(_)));
    /// ```
    pub fn from_arg(arg: &str) -> Result<Self, regex::Error> {
        match arg.strip_prefix('/').and_then(|rest| rest.strip_suffix('/')) {
            Some(source) if !source.is_empty() => Self::pattern(source),
            _ => Ok(Self::literal(arg)),
        }
    }

    /// Test this rule against a haystack
    pub fn is_match(&self, haystack: &str) -> bool {
        match self {
            Self::Literal(text) => haystack.contains(text.as_str()),
            Self::Pattern(regex) => regex.is_match(haystack),
        }
    }

    /// The literal text or the regex source
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(text) => text,
            Self::Pattern(regex) => regex.as_str(),
        }
    }
}

impl PartialEq for MatchRule {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

/// True if any rule in the list matches the haystack
pub fn any_match(rules: &[MatchRule], haystack: &str) -> bool {
    rules.iter().any(|rule| rule.is_match(haystack))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleRepr {
    Literal(String),
    Pattern { pattern: String },
}

#[derive(Serialize)]
#[serde(untagged)]
enum RuleReprRef<'a> {
    Literal(&'a str),
    Pattern { pattern: &'a str },
}

impl<'de> Deserialize<'de> for MatchRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RuleRepr::deserialize(deserializer)? {
            RuleRepr::Literal(text) => Ok(Self::Literal(text)),
            RuleRepr::Pattern { pattern } => Self::pattern(&pattern)
                .map_err(|e| serde::de::Error::custom(format!("invalid pattern '{}': {}", pattern, e))),
        }
    }
}

impl Serialize for MatchRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            Self::Literal(text) => RuleReprRef::Literal(text),
            Self::Pattern(regex) => RuleReprRef::Pattern { pattern: regex.as_str() },
        };
        repr.serialize(serializer)
    }
}
