//! Tree Utilities and the proof-tree node types.
//!
//! A [`TreeNode`] is the "real root" directly; the synthetic `root`
//! wrapper some tree libraries use is omitted here. Every function in
//! this module operates on a real root node, and splice/merge just means
//! "take these children and attach them under this node".

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// Marks the `data` of a node introduced to fan out alternative proofs.
pub const OR_BRANCH_TAG: &str = "or-branch:";

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A node identifier. Uniqueness, not unguessability, is all that's
/// required, so a monotonic counter stands in for a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn fresh() -> Self {
        NodeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Wrap a predicate as a basic-fact leaf sentinel, `#p#`.
pub fn fact_sentinel(predicate: &str) -> String {
    format!("#{predicate}#")
}

/// Is `data` a basic-fact sentinel, `#...#`?
pub fn is_fact_sentinel(data: &str) -> bool {
    data.len() >= 2 && data.starts_with('#') && data.ends_with('#')
}

/// A node in a proof tree: a display tag, a semantic `data` key, and an
/// identity distinct from both.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: NodeId,
    pub tag: String,
    pub data: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(tag: impl Into<String>, data: impl Into<String>) -> Self {
        TreeNode { id: NodeId::fresh(), tag: tag.into(), data: data.into(), children: Vec::new() }
    }

    pub fn leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn pre_leaf(&self) -> bool {
        !self.leaf() && self.children.iter().all(TreeNode::leaf)
    }

    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }

    /// A non-leaf whose children are all `or-branch:`-tagged.
    pub fn is_or_node(&self) -> bool {
        !self.leaf() && self.children[0].data.starts_with(OR_BRANCH_TAG)
    }
}

/// Enumerate every leaf in the tree, in breadth-first order.
pub fn bfs_leaves(root: &TreeNode) -> Vec<&TreeNode> {
    let mut out = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back(root);
    while let Some(n) = queue.pop_front() {
        if n.leaf() {
            out.push(n);
        } else {
            queue.extend(n.children.iter());
        }
    }
    out
}

/// Does any non-leaf node in the tree (root included) carry this `data`?
pub fn nonleaf_exists_with_same_data(data: &str, root: &TreeNode) -> bool {
    fn walk(n: &TreeNode, data: &str) -> bool {
        (!n.leaf() && n.data == data) || n.children.iter().any(|c| walk(c, data))
    }
    walk(root, data)
}

/// Deep-copy a tree, preserving tag/data topology but assigning every node
/// a freshly generated id.
pub fn deep_copy(n: &TreeNode) -> TreeNode {
    TreeNode {
        id: NodeId::fresh(),
        tag: n.tag.clone(),
        data: n.data.clone(),
        children: n.children.iter().map(deep_copy).collect(),
    }
}

/// Structural equality: a leaf is considered equal to a
/// pre-leaf with the same root `data` (the deliberate stub/expanded
/// equivalence); otherwise sizes, root `data`, and children pairwise must
/// all match.
pub fn identical_tree(a: &TreeNode, b: &TreeNode) -> bool {
    if (a.leaf() && b.pre_leaf()) || (a.pre_leaf() && b.leaf()) {
        return a.data == b.data;
    }
    if a.size() != b.size() || a.data != b.data {
        return false;
    }
    if a.size() == 1 {
        return true;
    }
    a.children.len() == b.children.len()
        && a.children.iter().zip(&b.children).all(|(x, y)| identical_tree(x, y))
}

/// Find the first expandable leaf (BFS order): not a basic-fact sentinel,
/// and whose `data` doesn't already label a non-leaf elsewhere in the tree.
/// Returns a path (child indices from the root) rather than a borrow, so the
/// caller can mutate the tree at that position afterwards.
pub(crate) fn find_first_leaf_to_expand_path(root: &TreeNode) -> Option<Vec<usize>> {
    let mut queue: VecDeque<Vec<usize>> = VecDeque::new();
    queue.push_back(Vec::new());
    while let Some(path) = queue.pop_front() {
        let node = node_at_path(root, &path);
        if node.leaf() {
            if !is_fact_sentinel(&node.data) && !nonleaf_exists_with_same_data(&node.data, root) {
                return Some(path);
            }
            continue;
        }
        for i in 0..node.children.len() {
            let mut child_path = path.clone();
            child_path.push(i);
            queue.push_back(child_path);
        }
    }
    None
}

pub(crate) fn node_at_path<'a>(root: &'a TreeNode, path: &[usize]) -> &'a TreeNode {
    path.iter().fold(root, |n, &i| &n.children[i])
}

pub(crate) fn node_at_path_mut<'a>(root: &'a mut TreeNode, path: &[usize]) -> &'a mut TreeNode {
    path.iter().fold(root, |n, &i| &mut n.children[i])
}

/// Find a leaf whose `data` equals one of its ancestors' `data` (root
/// included); return the path to that leaf's *parent*. `None` for "parent
/// is the root itself" (the parent can't be excised as a child, so the
/// caller clears the root's children instead) is represented as `Some([])`.
fn find_cyclic_removal(root: &TreeNode) -> Option<Vec<usize>> {
    let mut queue: VecDeque<(Vec<usize>, Vec<String>)> = VecDeque::new();
    queue.push_back((Vec::new(), Vec::new()));
    while let Some((path, ancestors)) = queue.pop_front() {
        let node = node_at_path(root, &path);
        if node.leaf() {
            if ancestors.iter().any(|a| *a == node.data) {
                return Some(if path.len() <= 1 { Vec::new() } else { path[..path.len() - 1].to_vec() });
            }
            continue;
        }
        let mut next_ancestors = ancestors;
        next_ancestors.push(node.data.clone());
        for i in 0..node.children.len() {
            let mut child_path = path.clone();
            child_path.push(i);
            queue.push_back((child_path, next_ancestors.clone()));
        }
    }
    None
}

fn remove_cyclic_once(root: &mut TreeNode) -> bool {
    match find_cyclic_removal(root) {
        None => false,
        Some(path) if path.is_empty() => {
            root.children.clear();
            true
        }
        Some(path) => {
            let parent = node_at_path_mut(root, &path[..path.len() - 1]);
            parent.children.remove(*path.last().unwrap());
            true
        }
    }
}

/// Cycle elimination: repeatedly remove the parent of any leaf
/// whose `data` matches an ancestor, until a full pass removes nothing,
/// then re-run OR-branch reorganization.
pub fn remove_cyclic_proofs(root: &mut TreeNode) {
    while remove_cyclic_once(root) {
        tracing::debug!(data = %root.data, "pruned a cyclic proof branch");
    }
    reorg_or_branches(root);
}

fn dedup_children(node: &mut TreeNode) {
    let mut i = 0;
    while i < node.children.len() {
        let mut j = i + 1;
        while j < node.children.len() {
            if identical_tree(&node.children[i], &node.children[j]) {
                tracing::debug!(data = %node.children[j].data, "deduplicated an OR-branch");
                node.children.remove(j);
            } else {
                j += 1;
            }
        }
        i += 1;
    }
}

fn reorg_at(node: &mut TreeNode) {
    if !node.is_or_node() {
        return;
    }
    dedup_children(node);
    if node.children.len() == 1 {
        let only_branch = node.children.remove(0);
        node.children = only_branch.children;
    } else {
        for (k, child) in node.children.iter_mut().enumerate() {
            child.tag = format!("Proof {}", k + 1);
        }
    }
}

/// OR-branch reorganization: at every OR-node, dedup children
/// by structural equality (preserving the first occurrence), promote a
/// surviving single child in place of the OR-layer, else re-tag `Proof N`.
pub fn reorg_or_branches(node: &mut TreeNode) {
    for child in &mut node.children {
        reorg_or_branches(child);
    }
    reorg_at(node);
}

/// Regular-tree projection: copy the root; for an OR-node,
/// recurse only into the first child; otherwise recurse into every child.
/// Re-applies OR-branch reorganization to the result.
pub fn project_regular_tree(root: &TreeNode) -> TreeNode {
    fn project(n: &TreeNode) -> TreeNode {
        let mut copy = TreeNode::new(n.tag.clone(), n.data.clone());
        if n.leaf() {
            return copy;
        }
        if n.is_or_node() {
            copy.children.push(project(&n.children[0]));
        } else {
            copy.children = n.children.iter().map(project).collect();
        }
        copy
    }
    let mut projected = project(root);
    reorg_or_branches(&mut projected);
    projected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(data: &str) -> TreeNode {
        TreeNode::new(data, data)
    }

    #[test]
    fn leaf_and_pre_leaf_predicates() {
        let mut n = TreeNode::new("c", "c");
        assert!(n.leaf());
        assert!(!n.pre_leaf());
        n.children.push(leaf("a"));
        n.children.push(leaf("b"));
        assert!(!n.leaf());
        assert!(n.pre_leaf());
    }

    #[test]
    fn bfs_leaves_enumerates_in_breadth_first_order() {
        let mut root = TreeNode::new("c", "c");
        let mut p1 = TreeNode::new("Proof 1", format!("{OR_BRANCH_TAG}c"));
        p1.children.push(leaf("a"));
        root.children.push(p1);
        root.children.push(leaf("b"));
        let leaves: Vec<&str> = bfs_leaves(&root).into_iter().map(|n| n.data.as_str()).collect();
        assert_eq!(leaves, vec!["b", "a"]);
    }

    #[test]
    fn fact_sentinel_round_trips() {
        assert_eq!(fact_sentinel("a"), "#a#");
        assert!(is_fact_sentinel("#a#"));
        assert!(!is_fact_sentinel("a"));
    }

    #[test]
    fn deep_copy_assigns_fresh_ids_but_same_topology() {
        let mut root = TreeNode::new("c", "c");
        root.children.push(leaf("a"));
        let copy = deep_copy(&root);
        assert_ne!(root.id, copy.id);
        assert_ne!(root.children[0].id, copy.children[0].id);
        assert_eq!(copy.data, "c");
        assert_eq!(copy.children.len(), 1);
    }

    #[test]
    fn identical_tree_treats_leaf_as_equal_to_matching_pre_leaf() {
        let stub = leaf("c");
        let mut expanded = TreeNode::new("c", "c");
        expanded.children.push(leaf("a"));
        expanded.children.push(leaf("b"));
        assert!(identical_tree(&stub, &expanded));
        assert!(identical_tree(&expanded, &stub));
    }

    #[test]
    fn identical_tree_requires_matching_data_and_children() {
        let mut a = TreeNode::new("c", "c");
        a.children.push(leaf("a"));
        let mut b = TreeNode::new("c", "c");
        b.children.push(leaf("x"));
        assert!(!identical_tree(&a, &b));
    }

    #[test]
    fn s6_cycle_pruned_to_single_node() {
        // proved[p]={{q}}, proved[q]={{p}} — spliced AND/OR tree before
        // pruning is p -> q -> p; after cycle elimination only `p` remains.
        let mut root = TreeNode::new("p", "p");
        let mut q = TreeNode::new("q", "q");
        q.children.push(TreeNode::new("p", "p"));
        root.children.push(q);
        remove_cyclic_proofs(&mut root);
        assert_eq!(root.size(), 1);
        assert_eq!(root.data, "p");
    }

    #[test]
    fn or_node_with_single_surviving_branch_is_promoted() {
        let mut root = TreeNode::new("c", "c");
        let mut branch = TreeNode::new("Proof 1", format!("{OR_BRANCH_TAG}c"));
        branch.children.push(leaf("a"));
        root.children.push(branch);
        reorg_or_branches(&mut root);
        assert!(!root.is_or_node());
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].data, "a");
    }

    #[test]
    fn or_node_children_are_retagged_after_dedup() {
        let mut root = TreeNode::new("c", "c");
        let mut p1 = TreeNode::new("Proof 1", format!("{OR_BRANCH_TAG}c"));
        p1.children.push(leaf("a"));
        let mut p2 = TreeNode::new("Proof 2", format!("{OR_BRANCH_TAG}c"));
        p2.children.push(leaf("b"));
        root.children.push(p1);
        root.children.push(p2);
        reorg_or_branches(&mut root);
        assert!(root.is_or_node());
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].tag, "Proof 1");
        assert_eq!(root.children[1].tag, "Proof 2");
    }

    #[test]
    fn regular_tree_projection_keeps_only_first_or_branch() {
        let mut root = TreeNode::new("c", "c");
        let mut p1 = TreeNode::new("Proof 1", format!("{OR_BRANCH_TAG}c"));
        p1.children.push(leaf("a"));
        let mut p2 = TreeNode::new("Proof 2", format!("{OR_BRANCH_TAG}c"));
        p2.children.push(leaf("b"));
        root.children.push(p1);
        root.children.push(p2);

        let regular = project_regular_tree(&root);
        assert_eq!(regular.data, "c");
        assert_eq!(regular.children.len(), 1);
        assert_eq!(regular.children[0].data, "a");
    }

    #[test]
    fn dedup_preserves_the_first_occurrence_of_a_duplicated_branch() {
        let mut root = TreeNode::new("c", "c");
        let mut p1 = TreeNode::new("Proof 1", format!("{OR_BRANCH_TAG}c"));
        p1.children.push(leaf("x"));
        let mut p2 = TreeNode::new("Proof 2", format!("{OR_BRANCH_TAG}c"));
        p2.children.push(leaf("y"));
        let mut p3 = TreeNode::new("Proof 3", format!("{OR_BRANCH_TAG}c"));
        p3.children.push(leaf("y"));
        root.children.push(p1);
        root.children.push(p2);
        root.children.push(p3);

        reorg_or_branches(&mut root);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].children[0].data, "x");
        assert_eq!(root.children[1].children[0].data, "y");
    }

    #[test]
    fn regular_tree_projection_is_idempotent() {
        let mut root = TreeNode::new("c", "c");
        root.children.push(leaf("a"));
        root.children.push(leaf("b"));
        let once = project_regular_tree(&root);
        let twice = project_regular_tree(&once);
        assert!(identical_tree(&once, &twice));
    }
}
