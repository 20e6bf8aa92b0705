//! Per-Fact Proof DAG Builder.
//!
//! Builds one bounded-depth "skeleton" tree per proved fact from the
//! Proved-Facts Map. These trees are the immutable templates the Query
//! Tree Assembler (`src/query_tree.rs`) clones and splices together.

use std::collections::{HashMap, HashSet};

use crate::trace::ProvedFacts;
use crate::tree::{fact_sentinel, TreeNode, OR_BRANCH_TAG};

/// `fact -> skeleton tree`, one entry per key of the Proved-Facts Map.
pub type Skeletons = HashMap<String, TreeNode>;

/// Build every fact's skeleton tree, BFS-expanded to `max_depth` levels.
///
/// The checked set (a memoization guarding against re-expanding the same
/// intermediate fact) is reset per skeleton, so re-expansion is only
/// prevented *within one fact's own tree* — a fact checked while building
/// one skeleton can still be freely expanded while building another's (see
/// DESIGN.md for the reasoning behind this choice).
pub fn build_skeletons(proved: &ProvedFacts, basic_facts: &HashSet<String>, max_depth: usize) -> Skeletons {
    let mut trees = Skeletons::new();
    let mut facts: Vec<&String> = proved.keys().collect();
    facts.sort();

    for fact in facts {
        let mut root = TreeNode::new(fact.clone(), fact.clone());
        let mut checked = basic_facts.clone();

        let mut queue = expand(&mut root, fact, &[], proved, basic_facts);
        let mut level = 0;
        while level < max_depth && !queue.is_empty() {
            level += 1;
            let mut next_queue = Vec::new();
            for (child_fact, parent_path) in queue {
                if !proved.contains_key(&child_fact) {
                    continue;
                }
                if checked.contains(&child_fact) {
                    continue;
                }
                if ancestor_chain_contains(&root, &parent_path, &child_fact) {
                    tracing::debug!(fact = %child_fact, "skipping cyclic skeleton expansion");
                    continue;
                }
                checked.insert(child_fact.clone());
                next_queue.extend(expand(&mut root, &child_fact, &parent_path, proved, basic_facts));
            }
            queue = next_queue;
        }

        trees.insert(fact.clone(), root);
    }

    trees
}

fn node_at_path_mut<'a>(root: &'a mut TreeNode, path: &[usize]) -> &'a mut TreeNode {
    path.iter().fold(root, |n, &i| &mut n.children[i])
}

/// Does `fact`'s data appear on the real root, or anywhere strictly
/// between the real root and the node at `path` (inclusive of that node)?
fn ancestor_chain_contains(root: &TreeNode, path: &[usize], fact: &str) -> bool {
    if root.data == fact {
        return true;
    }
    let mut node = root;
    for &i in path {
        node = &node.children[i];
        if node.data == fact {
            return true;
        }
    }
    false
}

/// Expand one fact's proofs under `parent_path`, creating an OR-layer only
/// when there is more than one proof (sorted ascending by cardinality for
/// determinism). Returns the `(child_fact, path)` pairs to consider at the
/// next BFS level.
fn expand(
    root: &mut TreeNode,
    fact: &str,
    parent_path: &[usize],
    proved: &ProvedFacts,
    basic_facts: &HashSet<String>,
) -> Vec<(String, Vec<usize>)> {
    let mut next = Vec::new();
    let Some(proof_sets) = proved.get(fact) else {
        return next;
    };

    let mut proofs: Vec<_> = proof_sets.iter().collect();
    proofs.sort_by_key(|proof| proof.len());

    for (idx, proof) in proofs.iter().enumerate() {
        let branch_path = if proofs.len() > 1 {
            let tag = format!("Proof {}", idx + 1);
            let data = format!("{OR_BRANCH_TAG}{fact}");
            let parent = node_at_path_mut(root, parent_path);
            parent.children.push(TreeNode::new(tag, data));
            let mut p = parent_path.to_vec();
            p.push(parent.children.len() - 1);
            p
        } else {
            parent_path.to_vec()
        };

        for g in proof.iter() {
            if !(basic_facts.contains(g) || proved.contains_key(g)) {
                continue;
            }
            let data = if basic_facts.contains(g) { fact_sentinel(g) } else { g.clone() };
            let parent = node_at_path_mut(root, &branch_path);
            parent.children.push(TreeNode::new(data.clone(), data));
            // The next BFS level expands `g` under the *same* attachment
            // point (`branch_path`), not under the node just created for
            // `g` itself — skeletons flatten a fact's transitive support
            // onto the attachment point of whichever proof discovered it;
            // genuine nesting across facts happens later, in the Query
            // Tree Assembler's leaf-splicing.
            next.push((g.clone(), branch_path.clone()));
        }
    }

    next
}
