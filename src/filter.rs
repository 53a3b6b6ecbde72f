//! Property and selector filtering
//!
//! `propList` entries use a tiny pattern syntax:
//!
//! | Entry     | Matches properties that...     |
//! |-----------|--------------------------------|
//! | `*`       | (anything)                     |
//! | `foo`     | equal `foo`                    |
//! | `*foo*`   | contain `foo`                  |
//! | `foo*`    | start with `foo`               |
//! | `*foo`    | end with `foo`                 |
//! | `!...`    | negation of any of the above   |
//!
//! Negated entries win over positive ones, including `*`. A list made of the
//! single entry `*` matches everything.

use crate::pattern::{any_match, MatchRule};

/// Property filter compiled from a `propList`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropMatcher {
    match_all: bool,
    has_wild: bool,
    exact: Vec<String>,
    contain: Vec<String>,
    start_with: Vec<String>,
    end_with: Vec<String>,
    not_exact: Vec<String>,
    not_contain: Vec<String>,
    not_start_with: Vec<String>,
    not_end_with: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Exact,
    Contain,
    StartWith,
    EndWith,
}

/// Split an entry body into its shape and the text to compare against.
/// Bodies with a `*` anywhere other than the ends are ignored.
fn classify(body: &str) -> Option<(Shape, &str)> {
    let (shape, text) = match (body.strip_prefix('*'), body.strip_suffix('*')) {
        (Some(rest), Some(_)) => (Shape::Contain, rest.strip_suffix('*')?),
        (Some(rest), None) => (Shape::EndWith, rest),
        (None, Some(rest)) => (Shape::StartWith, rest),
        (None, None) => (Shape::Exact, body),
    };
    if text.is_empty() || text.contains('*') {
        return None;
    }
    Some((shape, text))
}

impl PropMatcher {
    /// Compile a property list
    ///
    /// # Example
    ///
    /// ```
    /// use px2unit::PropMatcher;
    ///
    /// let matcher = PropMatcher::new(&["font*", "!font-weight"]);
    /// assert!(matcher.matches("font-size"));
    /// assert!(!matcher.matches("font-weight"));
    /// assert!(!matcher.matches("margin"));
    /// ```
    pub fn new<S: AsRef<str>>(prop_list: &[S]) -> Self {
        let mut matcher = Self::default();

        for entry in prop_list.iter().map(AsRef::as_ref) {
            if entry == "*" {
                matcher.has_wild = true;
                continue;
            }

            let (negated, body) = match entry.strip_prefix('!') {
                Some(body) => (true, body),
                None => (false, entry),
            };
            if body.contains('!') {
                continue;
            }
            let Some((shape, text)) = classify(body) else {
                continue;
            };

            let bucket = match (negated, shape) {
                (false, Shape::Exact) => &mut matcher.exact,
                (false, Shape::Contain) => &mut matcher.contain,
                (false, Shape::StartWith) => &mut matcher.start_with,
                (false, Shape::EndWith) => &mut matcher.end_with,
                (true, Shape::Exact) => &mut matcher.not_exact,
                (true, Shape::Contain) => &mut matcher.not_contain,
                (true, Shape::StartWith) => &mut matcher.not_start_with,
                (true, Shape::EndWith) => &mut matcher.not_end_with,
            };
            bucket.push(text.to_string());
        }

        matcher.match_all = matcher.has_wild && prop_list.len() == 1;
        matcher
    }

    /// Matcher that accepts every property
    pub fn match_all() -> Self {
        Self::new(&["*"])
    }

    /// Check whether `prop` is eligible for conversion
    pub fn matches(&self, prop: &str) -> bool {
        if self.match_all {
            return true;
        }

        let positive = self.has_wild
            || self.exact.iter().any(|m| m == prop)
            || self.contain.iter().any(|m| prop.contains(m.as_str()))
            || self.start_with.iter().any(|m| prop.starts_with(m.as_str()))
            || self.end_with.iter().any(|m| prop.ends_with(m.as_str()));

        positive && !self.is_negated(prop)
    }

    fn is_negated(&self, prop: &str) -> bool {
        self.not_exact.iter().any(|m| m == prop)
            || self.not_contain.iter().any(|m| prop.contains(m.as_str()))
            || self.not_start_with.iter().any(|m| prop.starts_with(m.as_str()))
            || self.not_end_with.iter().any(|m| prop.ends_with(m.as_str()))
    }
}

/// Check whether a rule's selector is on the denylist.
///
/// Declarations outside a style rule (inside `@font-face`, say) have no
/// selector and are never denylisted.
pub fn selector_is_denylisted(selector: Option<&str>, denylist: &[MatchRule]) -> bool {
    match selector {
        Some(selector) => any_match(denylist, selector),
        None => false,
    }
}
