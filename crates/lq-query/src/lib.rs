//! Lenient query parsing.
//!
//! This crate turns free-form search input into a boolean query tree and never
//! rejects what a user typed:
//!
//! - **Terms**: `rust` - words that must appear
//! - **Phrases**: `"error handling"` - adjacent sequences
//! - **Negation**: `-deprecated` or `NOT deprecated`
//! - **OR / AND**: `rust | golang`, `rust & async`; adjacent terms use the default
//! - **Grouping**: `(a b) | (c d)` - precedence control
//! - **Scopes**: `title:guide` - restrict to a configured field
//!
//! Processing happens in three stages: the [`Lexer`] rewrites the input into a
//! clean token stream, the [`Parser`] builds a raw tree with an operator-precedence
//! engine that drops whatever it cannot use, and the [`Normalizer`] rewrites the
//! tree to satisfy a [`Policy`]. Renderers in [`render`] turn the result into a
//! backend query string.
//!
//! # Example
//!
//! ```
//! use lq_query::{Node, parse};
//!
//! let tree = parse("rust (async | tokio) -deprecated").unwrap();
//! assert_eq!(
//!     tree,
//!     Node::and(vec![
//!         Node::term("rust"),
//!         Node::or(vec![Node::term("async"), Node::term("tokio")]),
//!         Node::not(Node::term("deprecated")),
//!     ])
//! );
//!
//! // Malformed input degrades instead of failing.
//! assert_eq!(parse("rust | ) -"), Some(Node::term("rust")));
//! assert_eq!(parse("  "), None);
//! ```

#![warn(missing_docs)]

mod ast;
mod config;
mod error;
mod lexer;
mod matcher;
mod parser;
pub mod render;
mod tree;

pub use ast::{Connective, Node};
pub use config::{
    NotScope, OperatorKind, ParserConfig, ParserConfigBuilder, Policy, Precedence, TermHook,
};
pub use error::{QueryError, RenderError};
pub use lexer::{Lexer, normalize, tokenize};
pub use matcher::Matcher;
pub use parser::Parser;
pub use tree::Normalizer;

/// A parser and a normalizer applied in sequence.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    /// Builds the raw tree.
    pub parser: Parser,
    /// Enforces the policy on the raw tree.
    pub normalizer: Normalizer,
}

impl Pipeline {
    /// Creates a pipeline from a parser configuration and a policy.
    pub fn new(config: ParserConfig, policy: Policy) -> Self {
        Self {
            parser: Parser::new(config),
            normalizer: Normalizer::new(policy),
        }
    }

    /// Parses and normalizes a query.
    pub fn run(&self, input: &str) -> Option<Node> {
        self.parser
            .parse(input)
            .and_then(|raw| self.normalizer.normalize(raw))
    }
}

/// Parses and normalizes a query with the default configuration and policy.
pub fn parse(input: &str) -> Option<Node> {
    Pipeline::default().run(input)
}
