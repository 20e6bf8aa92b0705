//! Clause Tokenizer.
//!
//! Splits the concatenated text of a KB's non-special lines into top-level
//! clause strings on unquoted/unnested `.` boundaries, routing directive
//! lines (`use_module(`, `query(`) to a separate passthrough list instead.

use regex::Regex;
use std::sync::OnceLock;

const SPECIAL_TOKENS: [&str; 2] = ["use_module(", "query("];

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// The result of tokenizing a KB's raw source lines.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TokenizeResult {
    /// Ordered top-level clause strings, ready for the Rule Parser.
    pub clauses: Vec<String>,
    /// Directive lines (`use_module(...)`, `query(...)`), verbatim aside
    /// from whitespace collapsing, in source order.
    pub special_lines: Vec<String>,
}

/// Tokenize the concatenated text of every eligible KB file, in source
/// order. `lines` is every line from every file, already in file-then-line
/// order; comment lines (`%...`) and blank lines must already be included
/// (they are dropped here) so callers don't need to pre-filter.
pub fn tokenize<'a>(lines: impl IntoIterator<Item = &'a str>) -> TokenizeResult {
    let mut special_lines = Vec::new();
    let mut clause_fragments = Vec::new();

    for raw_line in lines {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('%') {
            continue;
        }

        let collapsed = whitespace_run().replace_all(line, " ").into_owned();

        if SPECIAL_TOKENS.iter().any(|t| collapsed.contains(t)) {
            tracing::debug!(line = %collapsed, "routing directive line to passthrough");
            special_lines.push(collapsed);
            continue;
        }

        // Probability literals like `0.3::foo` would otherwise confuse the
        // dot-based clause splitter below; mask dots left of the first `::`.
        let fragment = match collapsed.find("::") {
            Some(idx) => {
                let (prefix, rest) = collapsed.split_at(idx);
                format!("{}{}", prefix.replace('.', "_dot_"), rest)
            }
            None => collapsed,
        };
        clause_fragments.push(fragment);
    }

    let joined = clause_fragments.concat();
    let mut clauses: Vec<String> = joined.split('.').map(|s| s.trim().to_string()).collect();
    // Drop the trailing empty segment produced by the final `.`.
    clauses.pop();

    for clause in &mut clauses {
        if clause.contains("_dot_") {
            *clause = clause.replace("_dot_", ".");
        }
    }
    clauses.retain(|c| !c.is_empty());

    tracing::debug!(clause_count = clauses.len(), "tokenized clauses");
    TokenizeResult { clauses, special_lines }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_comments_and_blank_lines() {
        let lines = ["% a comment", "", "a."];
        let result = tokenize(lines);
        assert_eq!(result.clauses, vec!["a"]);
    }

    #[test]
    fn routes_special_lines_separately() {
        let lines = [":- use_module(library(lists)).", "query(foo).", "a."];
        let result = tokenize(lines);
        assert_eq!(result.clauses, vec!["a"]);
        assert_eq!(
            result.special_lines,
            vec![":- use_module(library(lists)).".to_string(), "query(foo).".to_string()]
        );
    }

    #[test]
    fn dots_in_probability_literal_survive_round_trip() {
        // `0.3::head :- a,b.` round-trips intact.
        let lines = ["0.3::head :- a,b."];
        let result = tokenize(lines);
        assert_eq!(result.clauses, vec!["0.3::head :- a,b"]);
    }

    #[test]
    fn multiple_clauses_split_on_unnested_dots() {
        let lines = ["a. b. c :- a,b."];
        let result = tokenize(lines);
        assert_eq!(result.clauses, vec!["a", "b", "c :- a,b"]);
    }

    #[test]
    fn whitespace_runs_collapse_to_single_space() {
        let lines = ["p(a ,  b)   :-   q(c)."];
        let result = tokenize(lines);
        assert_eq!(result.clauses, vec!["p(a , b) :- q(c)"]);
    }

    #[test]
    fn clause_spanning_multiple_lines_concatenates_without_inserting_spaces() {
        // Lines are joined exactly as given (after per-line trim/collapse);
        // no separator is inserted between them.
        let lines = ["c :-", "    a,", "    b."];
        let result = tokenize(lines);
        assert_eq!(result.clauses, vec!["c :-a,b"]);
    }
}
