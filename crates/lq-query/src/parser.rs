//! Query parser.
//!
//! Turns the normalized token stream into a raw tree with an operator-precedence
//! (shunting-yard) engine. The grammar is total: unmatched quotes and
//! parentheses, leading, trailing or doubled operators all degrade to the closest
//! sensible tree instead of failing.
//!
//! # Precedence (defaults, highest to lowest)
//!
//! 1. Grouping: `(...)`, phrases: `"..."`
//! 2. Prefix operators: `-`/`NOT`, `scope:`
//! 3. The non-default connective (`|`/`OR` when the default is AND)
//! 4. The default connective, implicit between adjacent operands
//!
//! Equal precedence associates to the left.

use tracing::trace;

use crate::{
    ast::{Connective, Node},
    config::{OperatorKind, ParserConfig},
    lexer::Lexer,
};

/// A stacked operator.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    /// Binary `And`/`Or`.
    Binary(Connective),
    /// Prefix negation.
    Not,
    /// Prefix scope with its canonical name.
    Scope(String),
}

impl Op {
    /// Returns the precedence-table key of the operator.
    fn kind(&self) -> OperatorKind {
        match self {
            Self::Binary(c) => OperatorKind::from(*c),
            Self::Not => OperatorKind::Not,
            Self::Scope(_) => OperatorKind::Scope,
        }
    }
}

/// Builder state for one parse frame: the top level or one parenthesized group.
struct Frame<'c> {
    /// Configuration in effect.
    config: &'c ParserConfig,
    /// Connective of the node under construction.
    op: Connective,
    /// Operands built so far, most recent last.
    children: Vec<Node>,
    /// Pending operators with the position they were pushed at.
    stack: Vec<(Op, usize)>,
    /// Number of operands pushed in this frame.
    position: usize,
    /// Position of the most recent operand (0 when none).
    last_operand: usize,
    /// True when the next token should be an operand.
    expect_operand: bool,
}

impl<'c> Frame<'c> {
    /// Creates an empty frame.
    fn new(config: &'c ParserConfig) -> Self {
        Self {
            config,
            op: config.default_operator(),
            children: Vec::new(),
            stack: Vec::new(),
            position: 0,
            last_operand: 0,
            expect_operand: true,
        }
    }

    /// Consumes the tokens and returns the frame's node.
    fn run(mut self, tokens: &[String]) -> Node {
        let config = self.config;
        let mut i = 0;

        while i < tokens.len() {
            let token = tokens[i].as_str();
            i += 1;

            if config.quote_matcher().matches(token) {
                match find_quote(config, tokens, i) {
                    Some(end) => {
                        self.push_phrase(&tokens[i..end]);
                        i = end + 1;
                    }
                    None => trace!(token, "ignoring unmatched quote"),
                }
            } else if config.open_paren_matcher().matches(token) {
                match find_close_paren(config, tokens, i) {
                    Some(end) => {
                        let group = Frame::new(config).run(&tokens[i..end]);
                        if let Some(node) = collapse(group) {
                            self.push_operand(node);
                        }
                        i = end + 1;
                    }
                    None => trace!(token, "ignoring unmatched open parenthesis"),
                }
            } else if config.close_paren_matcher().matches(token) {
                trace!(token, "ignoring stray close parenthesis");
            } else if let Some(name) = scope_name(config, token) {
                self.push_operator(Op::Scope(name.to_string()));
            } else if config.or_matcher().matches(token) {
                self.push_operator(Op::Binary(Connective::Or));
            } else if config.and_matcher().matches(token) {
                self.push_operator(Op::Binary(Connective::And));
            } else if config.not_matcher().matches(token) {
                self.push_operator(Op::Not);
            } else if let Some(term) = config.normalize_term(token) {
                self.push_operand(Node::Term(term));
            } else {
                trace!(token, "term dropped by hook");
            }
        }

        self.finish()
    }

    /// Pushes a phrase built from the tokens between two quotes.
    fn push_phrase(&mut self, tokens: &[String]) {
        let terms: Vec<String> = tokens
            .iter()
            .filter(|t| !self.config.is_paren(t))
            .filter_map(|t| self.config.normalize_phrase_token(t))
            .collect();

        if terms.is_empty() {
            trace!("ignoring empty phrase");
            return;
        }
        self.push_operand(Node::Phrase(terms));
    }

    /// Appends an operand, inserting the default operator after another operand.
    fn push_operand(&mut self, node: Node) {
        if !self.expect_operand {
            self.push_operator(Op::Binary(self.config.default_operator()));
        }
        self.children.push(node);
        self.position += 1;
        self.last_operand = self.position;
        self.expect_operand = false;
    }

    /// Pushes an operator, reducing stacked operators that bind at least as tightly.
    fn push_operator(&mut self, op: Op) {
        if op.kind().is_unary() {
            // `a -b` means `a AND -b`.
            if !self.expect_operand {
                self.push_operator(Op::Binary(self.config.default_operator()));
            }
            // Prefix operators have no left operand, so nothing is reduced here.
            self.stack.push((op, self.position));
            self.expect_operand = true;
            return;
        }

        if self.expect_operand {
            trace!(?op, "ignoring operator without left operand");
            return;
        }

        let config = self.config;
        let precedence = config.precedence();
        let incoming = precedence.get(op.kind());
        while let Some((top, _)) = self.stack.last() {
            if precedence.get(top.kind()) < incoming {
                break;
            }
            if let Some((top, index)) = self.stack.pop() {
                self.reduce(top, index);
            }
        }

        self.stack.push((op, self.position));
        self.expect_operand = true;
    }

    /// Folds one stacked operator into the node under construction.
    fn reduce(&mut self, op: Op, index: usize) {
        if index >= self.last_operand {
            trace!(?op, index, "dropping dangling operator");
            return;
        }

        match op {
            Op::Not | Op::Scope(_) => {
                let Some(operand) = self.children.pop() else {
                    trace!(?op, "no operand for prefix operator");
                    return;
                };
                let node = match op {
                    Op::Scope(name) => Node::scope(name, operand),
                    _ => Node::not(operand),
                };
                self.children.push(node);
            }
            Op::Binary(connective) => self.reduce_binary(connective),
        }
    }

    /// Combines the two most recent operands with a binary connective.
    fn reduce_binary(&mut self, connective: Connective) {
        match self.children.len() {
            // Operators are only kept once an operand follows them, so a kept
            // binary operator always has both operands here.
            0 | 1 => trace!(%connective, "missing operand for binary operator"),
            _ => {
                let (Some(right), Some(left)) = (self.children.pop(), self.children.pop()) else {
                    return;
                };
                if self.op == connective {
                    self.children.push(left);
                    self.children.push(right);
                } else {
                    self.children
                        .push(Node::connected(connective, vec![left, right]));
                }
            }
        }
    }

    /// Reduces every remaining operator and returns the frame's node.
    fn finish(mut self) -> Node {
        while let Some((op, index)) = self.stack.pop() {
            self.reduce(op, index);
        }
        Node::connected(self.op, self.children)
    }
}

/// Returns the canonical scope name if the token is a `name:` prefix.
fn scope_name<'c>(config: &'c ParserConfig, token: &str) -> Option<&'c str> {
    if config.scopes().is_empty() {
        return None;
    }
    token
        .strip_suffix(':')
        .and_then(|name| config.canonical_scope(name))
}

/// Finds the next quote token at or after `start`.
fn find_quote(config: &ParserConfig, tokens: &[String], start: usize) -> Option<usize> {
    tokens[start..]
        .iter()
        .position(|t| config.quote_matcher().matches(t))
        .map(|offset| start + offset)
}

/// Finds the parenthesis closing a group opened just before `start`.
///
/// Quoted spans are skipped, so parentheses inside a phrase do not count.
fn find_close_paren(config: &ParserConfig, tokens: &[String], start: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut j = start;

    while j < tokens.len() {
        let token = tokens[j].as_str();
        if config.quote_matcher().matches(token) {
            if let Some(end) = find_quote(config, tokens, j + 1) {
                j = end + 1;
                continue;
            }
        } else if config.open_paren_matcher().matches(token) {
            depth += 1;
        } else if config.close_paren_matcher().matches(token) {
            depth -= 1;
            if depth == 0 {
                return Some(j);
            }
        }
        j += 1;
    }

    None
}

/// Unwraps an empty or single-child frame result.
fn collapse(node: Node) -> Option<Node> {
    match node {
        Node::And(mut children) | Node::Or(mut children) if children.len() <= 1 => {
            children.pop()
        }
        other => Some(other),
    }
}

/// Operator-precedence parser for lenient queries.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    /// Configuration shared by every parse.
    config: ParserConfig,
}

impl Parser {
    /// Creates a parser with the given configuration.
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Returns the parser configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Normalizes and splits the input without parsing it.
    pub fn tokens(&self, input: &str) -> Vec<String> {
        Lexer::new(&self.config).tokens(input)
    }

    /// Parses a query string into a raw tree.
    ///
    /// Returns `None` when the input holds nothing to search for. The raw tree may
    /// still contain nested same-connective nodes and policy violations; run it
    /// through [`Normalizer`](crate::Normalizer) for the well-formed form.
    pub fn parse(&self, input: &str) -> Option<Node> {
        self.parse_tokens(&self.tokens(input))
    }

    /// Parses an already normalized token stream.
    pub fn parse_tokens(&self, tokens: &[String]) -> Option<Node> {
        collapse(Frame::new(&self.config).run(tokens))
    }
}
