//! Shared data types for the KB Rewriter and the Proof-Tree Reconstructor.
//!
//! A [`Predicate`] keeps its original source text (internal spacing and
//! all), because that text is itself valid ProbLog/Prolog source — terms
//! like `X is Y+1` or `not foo(X)` rely on the spaces around their infix
//! operators and would stop parsing if every interior space were deleted.
//! What this system calls the "canonical form" (all interior whitespace
//! removed) is instead a comparison key: two predicates are equal, and
//! hash equal, iff their canonical forms match, even though their stored
//! text may differ cosmetically.

use std::fmt;

/// A predicate atom, e.g. `p(a,b)` or `X is Y+1`.
///
/// Equality and hashing use [`Predicate::canonical`] (all whitespace
/// stripped); [`Predicate::text`] returns the original source spacing,
/// which is what gets written back out into the instrumented KB.
#[derive(Debug, Clone, Eq)]
pub struct Predicate {
    text: String,
}

impl Predicate {
    pub fn new(text: impl Into<String>) -> Self {
        Predicate { text: text.into().trim().to_string() }
    }

    /// The original source text, spacing preserved.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The canonical (whitespace-free) comparison key.
    pub fn canonical(&self) -> String {
        self.text.chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// Strip a `P::` probability prefix, if present, returning the bare head.
    ///
    /// Facts carrying a probability annotation (`0.4::a`) are stored in the
    /// Basic Fact Set without it; probabilities otherwise only survive on
    /// the head line of a rule.
    pub fn strip_probability(&self) -> Predicate {
        match self.text.split_once("::") {
            Some((_, head)) => Predicate::new(head),
            None => self.clone(),
        }
    }

    /// Does this predicate's text contain one of the `not `/` is `
    /// ignore-patterns that exempt it from trace instrumentation
    /// Only makes sense checked against the spaced source
    /// text, not the canonical form — stripping whitespace from `not foo`
    /// or `X is Y` would make the patterns unmatchable against anything.
    pub fn matches_ignore_pattern(&self) -> bool {
        const IGNORED: [&str; 2] = ["not ", " is "];
        IGNORED.iter().any(|p| self.text.contains(p))
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl std::hash::Hash for Predicate {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Predicate {
    fn from(s: &str) -> Self {
        Predicate::new(s)
    }
}

impl From<String> for Predicate {
    fn from(s: String) -> Self {
        Predicate::new(s)
    }
}

/// A fact asserted without a body; stored in its probability-stripped,
/// canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fact(pub Predicate);

impl Fact {
    pub fn predicate(&self) -> &Predicate {
        &self.0
    }
}

/// A rule: an optional probability literal, a head predicate, and an
/// ordered sequence of body predicates (ordered as given in the source).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Verbatim numeric probability token, if the rule carried one.
    pub probability: Option<String>,
    pub head: Predicate,
    pub body: Vec<Predicate>,
}

impl Rule {
    pub fn new(probability: Option<String>, head: Predicate, body: Vec<Predicate>) -> Self {
        Rule { probability, head, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_equality_ignores_whitespace() {
        assert_eq!(Predicate::new("p( a , b )"), Predicate::new("p(a,b)"));
    }

    #[test]
    fn text_preserves_original_spacing() {
        assert_eq!(Predicate::new("X is Y+1").text(), "X is Y+1");
    }

    #[test]
    fn strip_probability_removes_prefix() {
        let p = Predicate::new("0.4::a");
        assert_eq!(p.strip_probability(), Predicate::new("a"));
        assert_eq!(p.strip_probability().text(), "a");
    }

    #[test]
    fn strip_probability_is_noop_without_prefix() {
        let p = Predicate::new("a");
        assert_eq!(p.strip_probability(), Predicate::new("a"));
    }

    #[test]
    fn ignore_pattern_requires_surrounding_space() {
        assert!(Predicate::new("not foo(X)").matches_ignore_pattern());
        assert!(Predicate::new("X is Y+1").matches_ignore_pattern());
        assert!(!Predicate::new("foo(X)").matches_ignore_pattern());
        assert!(!Predicate::new("isolated(X)").matches_ignore_pattern());
    }
}
