//! Property tests for the query pipeline.
//!
//! Parsing must be total, normalization idempotent, and the generic renderer's
//! output must parse back to the tree it came from.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use lq_query::{
    Node, Normalizer, NotScope, ParserConfig, Pipeline, Policy, normalize,
    render::GenericRenderer,
};
use proptest::prelude::*;

/// Input drawn from the characters the grammar cares about.
fn query_text() -> impl Strategy<Value = String> {
    "[abc \\-|&()\":\t]{0,40}|(a|b|OR|AND|NOT|-|\\(|\\)|\"| ){0,16}"
}

/// Arbitrary raw trees, including empty and single-child connectives.
fn raw_tree() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        "[a-c]".prop_map(Node::Term),
        prop::collection::vec("[a-c]", 0..3).prop_map(Node::Phrase),
    ];
    leaf.prop_recursive(5, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Node::And),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Node::Or),
            inner.clone().prop_map(Node::not),
            ("[xy]", inner).prop_map(|(name, child)| Node::scope(name, child)),
        ]
    })
}

/// Arbitrary normalizer policies.
fn policy() -> impl Strategy<Value = Policy> {
    let not_scope = prop_oneof![
        Just(NotScope::Allow),
        Just(NotScope::Invert),
        Just(NotScope::Drop),
    ];
    (
        any::<[bool; 6]>(),
        not_scope,
    )
        .prop_map(|(flags, not_scope)| Policy {
            allow_nested_scope: flags[0],
            allow_nested_not: flags[1],
            allow_unconstrained_not: flags[2],
            scope_is_constraint: flags[3],
            not_scope,
            scope_and_only: flags[4],
            scope_top_only: flags[5],
        })
}

/// Checks the structural guarantees of a normalized tree.
fn well_formed(node: &Node) -> bool {
    match node {
        Node::Term(text) => !text.is_empty(),
        Node::Phrase(words) => !words.is_empty(),
        Node::And(children) | Node::Or(children) => {
            children.len() >= 2
                && children
                    .iter()
                    .all(|c| c.connective() != node.connective() && well_formed(c))
        }
        Node::Not(child) | Node::Scope { child, .. } => well_formed(child),
    }
}

proptest! {
    #[test]
    fn parsing_never_panics(input in "\\PC{0,64}") {
        let _ = Pipeline::default().run(&input);
    }

    #[test]
    fn pipeline_output_is_well_formed(input in query_text(), policy in policy()) {
        let pipeline = Pipeline::new(ParserConfig::default(), policy);
        if let Some(tree) = pipeline.run(&input) {
            prop_assert!(well_formed(&tree), "{tree:?}");
        }
    }

    #[test]
    fn normalization_is_idempotent(tree in raw_tree(), policy in policy()) {
        let normalizer = Normalizer::new(policy);
        let once = normalizer.normalize(tree);
        if let Some(normalized) = once.clone() {
            prop_assert!(well_formed(&normalized), "{normalized:?}");
            prop_assert_eq!(normalizer.normalize(normalized), once);
        }
    }

    #[test]
    fn lexical_normalization_is_stable(input in query_text()) {
        let config = ParserConfig::default();
        if let Some(once) = normalize(&config, &input) {
            prop_assert!(!once.contains("  "));
            prop_assert_eq!(once.trim(), once.as_str());
            prop_assert_eq!(normalize(&config, &once), Some(once.clone()));
        }
    }

    #[test]
    fn generic_rendering_round_trips(input in query_text()) {
        let pipeline = Pipeline::default();
        let renderer = GenericRenderer::new(pipeline.parser.config());
        if let Some(tree) = pipeline.run(&input) {
            let rendered = renderer.to_query(&tree);
            prop_assert_eq!(pipeline.run(&rendered), Some(tree), "rendered as {}", rendered);
        }
    }
}
