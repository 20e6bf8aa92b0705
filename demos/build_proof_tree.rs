//! Parse a trace and assemble the AND/OR and regular proof trees for a query.

use std::collections::HashSet;

use xproblog::query_tree::build_tree;
use xproblog::skeleton::build_skeletons;
use xproblog::trace::parse_trace;
use xproblog::tree::TreeNode;

fn print_tree(node: &TreeNode, depth: usize) {
    println!("{}{}", "  ".repeat(depth), node.data);
    for child in &node.children {
        print_tree(child, depth + 1);
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let basic_facts: HashSet<String> = ["rains", "sprinkler_on"].into_iter().map(String::from).collect();

    let payload = [
        "wet\"is proved because:\"",
        "rains",
        "wet\"is proved because:\"",
        "sprinkler_on",
    ];

    let proved = parse_trace(payload, &basic_facts);
    let skeletons = build_skeletons(&proved, &basic_facts, 20);
    let (and_or, regular) = build_tree("wet", &basic_facts, &skeletons).unwrap();

    println!("AND/OR tree:");
    print_tree(&and_or, 0);
    println!("\nRegular (OR-collapsed) tree:");
    print_tree(&regular, 0);
}
