//! KB Rewriter.
//!
//! Orchestrates the Clause Tokenizer and Rule Parser across a KB's source
//! text, emitting the consolidated, trace-instrumented KB. Pure and
//! allocation-only: gathering the source lines from disk and diffing
//! against a previous generation on disk is the Engine Adapter's job
//! (`src/adapter.rs`); this module only ever sees in-memory strings.

use crate::model::{Fact, Predicate, Rule};
use crate::rule_parser::{parse_clause, Clause};
use crate::tokenizer::tokenize;

/// The consolidated KB text plus whether it is identical, line for line, to
/// whatever the caller passed as `previous`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenKb {
    pub text: String,
    pub unchanged: bool,
}

/// Rewrite a KB from the concatenated raw lines of every eligible source
/// file (already in file-then-line order; filtering by filename, `.bak`
/// backup, and file enumeration are the adapter's job). `previous` is the
/// text of the prior consolidated KB, if one existed, for change detection.
pub fn rewrite<'a>(lines: impl IntoIterator<Item = &'a str>, previous: Option<&str>) -> RewrittenKb {
    let tokenized = tokenize(lines);

    let mut facts = Vec::new();
    let mut rules = Vec::new();
    for clause in &tokenized.clauses {
        match parse_clause(clause) {
            Ok(Clause::Fact(f)) => facts.push(f),
            Ok(Clause::Rule(r)) => rules.push(r),
            Err(err) => {
                tracing::warn!(%clause, error = %err, "dropping unparseable clause");
            }
        }
    }

    let text = render(&facts, &rules, &tokenized.special_lines);
    let unchanged = previous.is_some_and(|prev| same_lines(&text, prev));

    tracing::info!(
        fact_count = facts.len(),
        rule_count = rules.len(),
        unchanged,
        "rewrote consolidated KB"
    );

    RewrittenKb { text, unchanged }
}

fn same_lines(a: &str, b: &str) -> bool {
    a.lines().eq(b.lines())
}

fn render(facts: &[Fact], rules: &[Rule], special_lines: &[String]) -> String {
    let mut out = String::new();

    out.push_str("%BEGIN:BASIC_FACTS\n");
    for fact in facts {
        out.push_str(fact.predicate().text());
        out.push_str(".\n");
    }
    out.push_str("%END:BASIC_FACTS\n\n");

    out.push_str("%BEGIN:RULES\n");
    for rule in rules {
        render_rule(&mut out, rule);
    }
    out.push_str("%END:RULES\n\n");

    for line in special_lines {
        if line.contains("use_module(") && !line.contains(".py") {
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }

    out
}

fn render_rule(out: &mut String, rule: &Rule) {
    match &rule.probability {
        Some(p) => out.push_str(&format!("{}::{} :-\n", p, rule.head.text())),
        None => out.push_str(&format!("{} :-\n", rule.head.text())),
    }

    let header = format!(
        "write(\"xproblog:\"),write({}),write(\"is proved because:\"),nl",
        rule.head.text()
    );
    let instrumentation = instrument_body(&rule.body);

    for p in &rule.body {
        out.push_str(&format!("\t{},\n", p.text()));
    }
    out.push_str(&format!("\t{},\n", header));
    out.push_str(&format!("\t{}.\n", instrumentation));
}

/// Build the trailing instrumentation fragment: one
/// `write("xproblog:"),write(p),nl,` per body predicate that doesn't match
/// an ignore pattern, joined, with the final fragment's trailing comma
/// stripped (mirrors `''.join(extended_body)[:-1]`, which is `""` when no
/// predicate survives the filter).
fn instrument_body(body: &[Predicate]) -> String {
    let joined: String = body
        .iter()
        .filter(|p| !p.matches_ignore_pattern())
        .map(|p| format!("write(\"xproblog:\"),write({}),nl,", p.text()))
        .collect();
    joined.strip_suffix(',').unwrap_or(&joined).to_string()
}
