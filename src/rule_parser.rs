//! Rule Parser.
//!
//! Decomposes a single clause string into either a [`Fact`] or a [`Rule`],
//! splitting the rule body on commas that sit outside any parentheses.

use crate::error::{Result, XprologError};
use crate::model::{Fact, Predicate, Rule};

/// A parsed clause: either a bare fact or a head/body rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Fact(Fact),
    Rule(Rule),
}

/// Parse one clause string (as produced by the Clause Tokenizer) into a
/// [`Clause`].
pub fn parse_clause(clause: &str) -> Result<Clause> {
    match clause.find(":-") {
        None => Ok(Clause::Fact(Fact(Predicate::new(clause).strip_probability()))),
        Some(arrow) => {
            let head_part = &clause[..arrow];
            let body_part = &clause[arrow + 2..];

            let head_nospace: String = head_part.chars().filter(|c| !c.is_whitespace()).collect();
            let (probability, head) = match head_nospace.split_once("::") {
                Some((prob, head)) => (Some(prob.to_string()), head.to_string()),
                None => (None, head_nospace),
            };

            let body = parse_body(body_part)?;
            tracing::debug!(%head, body_len = body.len(), "parsed rule");
            Ok(Clause::Rule(Rule::new(
                probability,
                Predicate::new(head),
                body.into_iter().map(Predicate::new).collect(),
            )))
        }
    }
}

/// Split a rule body on top-level (paren-depth-zero) commas.
fn parse_body(body_part: &str) -> Result<Vec<String>> {
    let mut body_str = body_part.to_string();
    body_str.push(',');
    let chars: Vec<char> = body_str.chars().collect();

    let mut predicates = Vec::new();
    let mut marker = 0usize;
    for i in 0..chars.len() {
        if chars[i] == ',' && !in_parentheses(i, &chars)? {
            let predicate: String = chars[marker..i].iter().collect();
            predicates.push(predicate.trim().to_string());
            marker = i + 1;
        }
    }
    Ok(predicates)
}

/// Is position `i` inside a (possibly nested) pair of parentheses in
/// `chars`? Index `0` and the last index are defined as never inside.
fn in_parentheses(i: usize, chars: &[char]) -> Result<bool> {
    if i >= chars.len() {
        return Err(XprologError::IndexOutOfRange { index: i, len: chars.len() });
    }
    if i == 0 || i == chars.len() - 1 {
        return Ok(false);
    }

    let mut left_depth = 0i64;
    for &c in &chars[..i] {
        match c {
            '(' => left_depth += 1,
            ')' => {
                if left_depth > 0 {
                    left_depth -= 1;
                }
            }
            _ => {}
        }
    }

    let mut right_depth = 0i64;
    for &c in chars[i + 1..].iter().rev() {
        match c {
            ')' => right_depth += 1,
            '(' => {
                if right_depth > 0 {
                    right_depth -= 1;
                }
            }
            _ => {}
        }
    }

    Ok(left_depth > 0 && right_depth > 0)
}
