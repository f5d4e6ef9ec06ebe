//! Renders trees back into the lenient query syntax.

use crate::{
    ast::{Connective, Node},
    config::{OperatorKind, ParserConfig, Precedence},
    error::RenderError,
    render::Renderer,
};

/// Renders trees using the canonical spellings of a parser configuration.
///
/// The output parses back to the same tree under that configuration: the
/// default operator is written as a space, and groups are parenthesized only
/// where precedence requires it.
#[derive(Debug, Clone)]
pub struct GenericRenderer {
    /// Connective written as a bare space.
    default_operator: Connective,
    /// Precedence used to decide where parentheses are needed.
    precedence: Precedence,
    /// AND spelling.
    and: String,
    /// OR spelling.
    or: String,
    /// NOT spelling.
    not: String,
    /// Quote spelling.
    quote: String,
    /// Opening parenthesis spelling.
    open: String,
    /// Closing parenthesis spelling.
    close: String,
}

impl GenericRenderer {
    /// Creates a renderer for the given parser configuration.
    pub fn new(config: &ParserConfig) -> Self {
        let spell = |canonical: Option<String>, fallback: &str| {
            canonical.unwrap_or_else(|| fallback.to_string())
        };
        Self {
            default_operator: config.default_operator(),
            precedence: config.precedence().clone(),
            and: spell(config.and_matcher().canonical(), "AND"),
            or: spell(config.or_matcher().canonical(), "OR"),
            not: spell(config.not_matcher().canonical(), "NOT"),
            quote: spell(config.quote_matcher().canonical(), "\""),
            open: spell(config.open_paren_matcher().canonical(), "("),
            close: spell(config.close_paren_matcher().canonical(), ")"),
        }
    }

    /// Renders a tree as a query string.
    pub fn to_query(&self, node: &Node) -> String {
        let mut out = String::new();
        self.write(node, &mut out);
        out
    }

    /// Appends the rendering of `node` to `out`.
    fn write(&self, node: &Node, out: &mut String) {
        match node {
            Node::Term(text) => out.push_str(text),
            Node::Phrase(words) => {
                out.push_str(&self.quote);
                out.push_str(&words.join(" "));
                out.push_str(&self.quote);
            }
            Node::And(children) => self.write_connected(Connective::And, children, out),
            Node::Or(children) => self.write_connected(Connective::Or, children, out),
            Node::Not(child) => {
                out.push_str(&self.not);
                // Multi-character spellings such as `NOT` need a separator.
                if self.not.chars().count() > 1 {
                    out.push(' ');
                }
                self.write_operand(child, out);
            }
            Node::Scope { name, child } => {
                out.push_str(name);
                out.push(':');
                self.write_operand(child, out);
            }
        }
    }

    /// Writes the children of a variadic node joined by its operator.
    fn write_connected(&self, op: Connective, children: &[Node], out: &mut String) {
        let separator = if op == self.default_operator {
            String::from(" ")
        } else {
            match op {
                Connective::And => format!(" {} ", self.and),
                Connective::Or => format!(" {} ", self.or),
            }
        };

        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                out.push_str(&separator);
            }
            match child.connective() {
                Some(inner) if inner != op && self.binds_looser(inner, op) => {
                    self.write_group(child, out);
                }
                _ => self.write(child, out),
            }
        }
    }

    /// Writes the operand of a unary operator, grouping binary operands.
    fn write_operand(&self, node: &Node, out: &mut String) {
        if node.connective().is_some() {
            self.write_group(node, out);
        } else {
            self.write(node, out);
        }
    }

    /// Writes a parenthesized node.
    fn write_group(&self, node: &Node, out: &mut String) {
        out.push_str(&self.open);
        self.write(node, out);
        out.push_str(&self.close);
    }

    /// Whether `inner` would not survive unparenthesized under `outer`.
    fn binds_looser(&self, inner: Connective, outer: Connective) -> bool {
        self.precedence.get(OperatorKind::from(inner))
            <= self.precedence.get(OperatorKind::from(outer))
    }
}

impl Default for GenericRenderer {
    fn default() -> Self {
        Self::new(&ParserConfig::default())
    }
}

impl Renderer for GenericRenderer {
    fn render(&self, node: &Node) -> Result<String, RenderError> {
        Ok(self.to_query(node))
    }
}
