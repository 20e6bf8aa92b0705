//! Rewrite a small KB and print the consolidated, trace-instrumented result.

use xproblog::rewriter::rewrite;

fn main() {
    tracing_subscriber::fmt::init();

    let source = [
        "0.3::rains.",
        "0.8::sprinkler_on.",
        "wet :- rains.",
        "wet :- sprinkler_on.",
        ":- use_module(library(lists)).",
    ];

    let rewritten = rewrite(source, None);
    println!("{}", rewritten.text);
    println!("unchanged from previous generation: {}", rewritten.unchanged);
}
