//! Query Tree Assembler.
//!
//! Splices per-fact skeletons together into a full AND/OR proof tree for a
//! user query, then projects the regular (OR-collapsed) tree from it.

use std::collections::HashSet;

use crate::error::{Result, XprologError};
use crate::skeleton::Skeletons;
use crate::tree::{
    deep_copy, fact_sentinel, find_first_leaf_to_expand_path, node_at_path, node_at_path_mut,
    project_regular_tree, remove_cyclic_proofs, TreeNode,
};

/// Build the AND/OR tree for `query` and its projected regular tree.
pub fn build_tree(
    query: &str,
    basic_facts: &HashSet<String>,
    skeletons: &Skeletons,
) -> Result<(TreeNode, TreeNode)> {
    let and_or = build_and_or_tree(query, basic_facts, skeletons)?;
    let regular = project_regular_tree(&and_or);
    Ok((and_or, regular))
}

/// Build just the AND/OR tree, without the regular-tree projection.
pub fn build_and_or_tree(query: &str, basic_facts: &HashSet<String>, skeletons: &Skeletons) -> Result<TreeNode> {
    if basic_facts.contains(query) {
        let data = fact_sentinel(query);
        return Ok(TreeNode::new(data.clone(), data));
    }

    let skeleton = skeletons
        .get(query)
        .ok_or_else(|| XprologError::UnknownQuery(query.to_string()))?;

    let mut tree = deep_copy(skeleton);
    while let Some(path) = find_first_leaf_to_expand_path(&tree) {
        splice_skeleton_at(&mut tree, &path, skeletons);
    }

    remove_cyclic_proofs(&mut tree);
    tracing::debug!(%query, size = tree.size(), "assembled AND/OR tree");
    Ok(tree)
}

/// Deep-clone the skeleton for the fact at `path` and attach its children
/// under that leaf. A skeleton's own root already carries the fact's data,
/// so only its *children* need to be grafted on.
fn splice_skeleton_at(tree: &mut TreeNode, path: &[usize], skeletons: &Skeletons) {
    let fact = node_at_path(tree, path).data.clone();
    let Some(skeleton) = skeletons.get(&fact) else {
        return;
    };
    let spliced: Vec<TreeNode> = skeleton.children.iter().map(deep_copy).collect();
    node_at_path_mut(tree, path).children = spliced;
}
