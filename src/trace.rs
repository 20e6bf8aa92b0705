//! Trace Parser.
//!
//! Consumes the `xproblog:`-tagged payload lines the Engine Adapter split
//! out of the inference engine's stdout and builds the Proved-Facts Map.

use std::collections::{HashMap, HashSet};

/// An unordered witness for one fact: the set of predicates that, taken
/// together, imply it.
pub type ProofSet = std::collections::BTreeSet<String>;

/// `fact -> alternative proofs, in trace-arrival order`. A `Vec` rather
/// than a `HashSet` because ordering guarantee (2) ties an OR-node's
/// branch order to arrival order for proofs of equal cardinality; a hash
/// collection would throw that away. Duplicate proof sets (same fact,
/// same witnesses) are still collapsed to their first occurrence.
pub type ProvedFacts = HashMap<String, Vec<ProofSet>>;

const HEADER_SENTINEL: &str = "\"is proved because:\"";

/// Parse payload lines into the Proved-Facts Map, then drop any key that
/// also appears in the Basic Fact Set (a fact cannot be both basic and
/// proved; the basic classification wins).
pub fn parse_trace<'a>(
    payload_lines: impl IntoIterator<Item = &'a str>,
    basic_facts: &HashSet<String>,
) -> ProvedFacts {
    let lines: Vec<String> = payload_lines
        .into_iter()
        .map(|l| l.chars().filter(|c| !c.is_whitespace()).collect())
        .collect();

    let mut proved: ProvedFacts = HashMap::new();
    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        if !line.contains(HEADER_SENTINEL) {
            tracing::warn!(%line, "malformed trace line, ignoring");
            i += 1;
            continue;
        }

        let Some(quote) = line.find('"') else {
            tracing::warn!(%line, "header line missing opening quote, ignoring");
            i += 1;
            continue;
        };
        let fact = line[..quote].to_string();

        let mut witnesses = ProofSet::new();
        let mut j = i + 1;
        while j < lines.len() && !lines[j].contains(HEADER_SENTINEL) {
            witnesses.insert(lines[j].clone());
            j += 1;
        }

        let proofs = proved.entry(fact).or_default();
        if !proofs.contains(&witnesses) {
            proofs.push(witnesses);
        }
        i = j;
    }

    proved.retain(|fact, _| {
        let keep = !basic_facts.contains(fact);
        if !keep {
            tracing::debug!(%fact, "dropping proved-fact entry duplicated in the basic fact set");
        }
        keep
    });
    proved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(strs: &[&str]) -> HashSet<String> {
        strs.iter().map(|s| s.to_string()).collect()
    }

    fn proof(strs: &[&str]) -> ProofSet {
        strs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn s2_single_proof() {
        let lines = ["c\"is proved because:\"", "a", "b"];
        let proved = parse_trace(lines, &facts(&["a", "b"]));
        assert_eq!(proved.get("c").unwrap().len(), 1);
        assert!(proved["c"].contains(&proof(&["a", "b"])));
    }

    #[test]
    fn equal_cardinality_proofs_keep_trace_arrival_order() {
        let lines = [
            "c\"is proved because:\"",
            "b",
            "c\"is proved because:\"",
            "a",
        ];
        let proved = parse_trace(lines, &facts(&["a", "b"]));
        assert_eq!(proved["c"], vec![proof(&["b"]), proof(&["a"])]);
    }

    #[test]
    fn s3_duplicate_proofs_collapse_via_set_semantics() {
        let lines = [
            "c\"is proved because:\"",
            "a",
            "c\"is proved because:\"",
            "a",
        ];
        let proved = parse_trace(lines, &facts(&["a"]));
        assert_eq!(proved["c"].len(), 1);
    }

    #[test]
    fn s4_two_distinct_proofs() {
        let lines = [
            "c\"is proved because:\"",
            "a",
            "c\"is proved because:\"",
            "b",
        ];
        let proved = parse_trace(lines, &facts(&["a", "b"]));
        assert_eq!(proved["c"].len(), 2);
    }

    #[test]
    fn whitespace_is_stripped_from_every_payload_line() {
        let lines = [" c \"is proved because:\" ", " a , b "];
        let proved = parse_trace(lines, &facts(&["a,b"]));
        assert!(proved.contains_key("c"));
        assert!(proved["c"].contains(&proof(&["a,b"])));
    }

    #[test]
    fn basic_fact_wins_over_a_duplicate_proved_entry() {
        let lines = ["a\"is proved because:\"", "b"];
        let proved = parse_trace(lines, &facts(&["a", "b"]));
        assert!(!proved.contains_key("a"));
    }

    #[test]
    fn malformed_lines_outside_any_header_are_ignored() {
        let lines = ["garbage", "c\"is proved because:\"", "a"];
        let proved = parse_trace(lines, &facts(&["a"]));
        assert_eq!(proved.len(), 1);
        assert!(proved.contains_key("c"));
    }
}
