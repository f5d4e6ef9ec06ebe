//! Renders trees into SQLite FTS5 `MATCH` expressions.
//!
//! FTS5 has no unary NOT: `a NOT b` subtracts the right side from the left. A
//! negation is only expressible as a child of an `And` that also has a positive
//! child, optionally wrapped in scopes. Normalizing with
//! [`Policy::strict`](crate::Policy::strict) and
//! [`NotScope::Invert`](crate::NotScope::Invert) removes most other negations;
//! the rest are reported as [`RenderError::UnconstrainedNot`].

use crate::{ast::Node, error::RenderError, render::Renderer};

/// Words FTS5 treats as operators when written bare.
const KEYWORDS: [&str; 4] = ["AND", "OR", "NOT", "NEAR"];

/// Renders trees as FTS5 query strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fts5Renderer;

impl Fts5Renderer {
    /// Creates a renderer.
    pub fn new() -> Self {
        Self
    }

    /// Renders an expression in a position where a negation is not allowed.
    fn expr(&self, node: &Node) -> Result<String, RenderError> {
        match node {
            Node::Term(text) => Ok(quote(text)),
            Node::Phrase(words) => Ok(quote_phrase(words)),
            Node::And(children) => self.and(children),
            Node::Or(children) => {
                let parts = children
                    .iter()
                    .map(|c| self.operand(c))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(parts.join(" OR "))
            }
            Node::Not(_) => Err(RenderError::UnconstrainedNot),
            Node::Scope { name, child } => {
                Ok(format!("{} : ({})", quote(name), self.expr(child)?))
            }
        }
    }

    /// Renders an expression, parenthesizing it when it has operators.
    fn operand(&self, node: &Node) -> Result<String, RenderError> {
        let rendered = self.expr(node)?;
        if node.connective().is_some() {
            Ok(format!("({rendered})"))
        } else {
            Ok(rendered)
        }
    }

    /// Renders the positive form of a negated child, or `None` if it is not one.
    ///
    /// `Scope(name, Not(x))` counts as negated: it is subtracted as `name : (x)`.
    fn negated(&self, node: &Node) -> Option<Result<String, RenderError>> {
        let mut scopes = Vec::new();
        let mut current = node;
        while let Node::Scope { name, child } = current {
            scopes.push(name.as_str());
            current = child;
        }
        let Node::Not(inner) = current else {
            return None;
        };

        let mut rendered = if scopes.is_empty() {
            self.operand(inner)
        } else {
            self.expr(inner)
        };
        for name in scopes.iter().rev() {
            rendered = rendered.map(|s| format!("{} : ({s})", quote(name)));
        }
        Some(rendered)
    }

    /// Renders a conjunction, subtracting its negated children.
    fn and(&self, children: &[Node]) -> Result<String, RenderError> {
        let mut positive = Vec::new();
        let mut negative = Vec::new();
        for child in children {
            match self.negated(child) {
                Some(rendered) => negative.push(rendered?),
                None => positive.push(self.operand(child)?),
            }
        }

        if positive.is_empty() {
            return Err(RenderError::UnconstrainedNot);
        }
        if negative.is_empty() {
            return Ok(positive.join(" AND "));
        }

        let mut out = if positive.len() > 1 {
            format!("({})", positive.join(" AND "))
        } else {
            positive.join("")
        };
        for neg in negative {
            out.push_str(" NOT ");
            out.push_str(&neg);
        }
        Ok(out)
    }
}

impl Renderer for Fts5Renderer {
    fn render(&self, node: &Node) -> Result<String, RenderError> {
        self.expr(node)
    }
}

/// Whether a token can be written as an FTS5 bareword.
fn is_bareword(token: &str) -> bool {
    !token.is_empty()
        && !KEYWORDS.contains(&token)
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii())
}

/// Writes a token as a bareword or a double-quoted string.
fn quote(token: &str) -> String {
    if is_bareword(token) {
        token.to_string()
    } else {
        format!("\"{}\"", token.replace('"', "\"\""))
    }
}

/// Writes a phrase as one double-quoted string.
fn quote_phrase(words: &[String]) -> String {
    format!("\"{}\"", words.join(" ").replace('"', "\"\""))
}

/// Term hook dropping tokens with nothing FTS5 would index.
///
/// The default tokenizer discards punctuation, so a term made only of
/// punctuation matches nothing and is better removed before normalization.
pub fn sanitize_term(token: &str) -> Option<String> {
    token
        .chars()
        .any(char::is_alphanumeric)
        .then(|| token.to_string())
}
