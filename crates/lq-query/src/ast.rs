//! Query abstract syntax tree.
//!
//! The parser produces a raw tree that may still contain empty or single-child
//! boolean nodes; the tree normalizer turns it into a tree where every `And`/`Or`
//! has at least two children. Absence of a query is `None`, never an empty node.

use std::fmt;

use serde::Serialize;

/// The two variadic boolean connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Connective {
    /// Conjunction.
    And,
    /// Disjunction.
    Or,
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "And"),
            Self::Or => write!(f, "Or"),
        }
    }
}

/// A node of the query tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// A single literal token.
    Term(String),

    /// An ordered sequence of terms matched as an adjacent span.
    Phrase(Vec<String>),

    /// Conjunction: all children must match.
    And(Vec<Self>),

    /// Disjunction: at least one child must match.
    Or(Vec<Self>),

    /// Negation of the child.
    Not(Box<Self>),

    /// Restricts the child to a named field or context.
    Scope {
        /// Scope identifier, as configured.
        name: String,
        /// The restricted subtree.
        child: Box<Self>,
    },
}

impl Node {
    /// Creates a term leaf.
    pub fn term(text: impl Into<String>) -> Self {
        Self::Term(text.into())
    }

    /// Creates a phrase leaf.
    pub fn phrase<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Phrase(terms.into_iter().map(Into::into).collect())
    }

    /// Creates a raw `And` node without any flattening.
    pub fn and(children: Vec<Self>) -> Self {
        Self::And(children)
    }

    /// Creates a raw `Or` node without any flattening.
    pub fn or(children: Vec<Self>) -> Self {
        Self::Or(children)
    }

    /// Creates a negation.
    pub fn not(child: Self) -> Self {
        Self::Not(Box::new(child))
    }

    /// Creates a scope restriction.
    pub fn scope(name: impl Into<String>, child: Self) -> Self {
        Self::Scope {
            name: name.into(),
            child: Box::new(child),
        }
    }

    /// Creates a raw variadic node for the given connective.
    pub fn connected(op: Connective, children: Vec<Self>) -> Self {
        match op {
            Connective::And => Self::And(children),
            Connective::Or => Self::Or(children),
        }
    }

    /// Builds a well-formed variadic node.
    ///
    /// Children using the same connective are spliced into the parent, a single
    /// remaining child replaces the node, and no children yields `None`.
    pub fn variadic(op: Connective, children: Vec<Self>) -> Option<Self> {
        let mut flattened = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Self::And(inner) if op == Connective::And => flattened.extend(inner),
                Self::Or(inner) if op == Connective::Or => flattened.extend(inner),
                other => flattened.push(other),
            }
        }

        match flattened.len() {
            0 => None,
            1 => flattened.pop(),
            _ => Some(Self::connected(op, flattened)),
        }
    }

    /// Returns the connective of an `And`/`Or` node.
    pub fn connective(&self) -> Option<Connective> {
        match self {
            Self::And(_) => Some(Connective::And),
            Self::Or(_) => Some(Connective::Or),
            _ => None,
        }
    }

    /// Whether this subtree is guaranteed to narrow results.
    ///
    /// Terms and phrases always constrain. `And` constrains when any child does,
    /// `Or` only when every child does. A scope constrains through its child when
    /// `scope_is_constraint` is set. `Not` never constrains.
    pub fn is_constraint(&self, scope_is_constraint: bool) -> bool {
        match self {
            Self::Term(_) | Self::Phrase(_) => true,
            Self::And(children) => children
                .iter()
                .any(|c| c.is_constraint(scope_is_constraint)),
            Self::Or(children) => {
                !children.is_empty()
                    && children
                        .iter()
                        .all(|c| c.is_constraint(scope_is_constraint))
            }
            Self::Not(_) => false,
            Self::Scope { child, .. } => {
                scope_is_constraint && child.is_constraint(scope_is_constraint)
            }
        }
    }

    /// Counts the nodes in this subtree.
    pub fn size(&self) -> usize {
        match self {
            Self::Term(_) | Self::Phrase(_) => 1,
            Self::And(children) | Self::Or(children) => {
                1 + children.iter().map(Self::size).sum::<usize>()
            }
            Self::Not(child) | Self::Scope { child, .. } => 1 + child.size(),
        }
    }

    /// Formats the node as an indented tree.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Term(s) => writeln!(f, "{prefix}Term({s:?})"),
            Self::Phrase(words) => writeln!(f, "{prefix}Phrase({words:?})"),
            Self::Not(child) => {
                writeln!(f, "{prefix}Not")?;
                child.fmt_tree(f, indent + 1)
            }
            Self::And(children) | Self::Or(children) => {
                let label = if matches!(self, Self::And(_)) {
                    "And"
                } else {
                    "Or"
                };
                writeln!(f, "{prefix}{label}")?;
                for child in children {
                    child.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
            Self::Scope { name, child } => {
                writeln!(f, "{prefix}Scope({name:?})")?;
                child.fmt_tree(f, indent + 1)
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}
