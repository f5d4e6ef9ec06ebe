//! Tree normalization.
//!
//! Rewrites a raw parse tree into a tree that satisfies a [`Policy`]. Disallowed
//! constructs are deleted, never reported, so the result is either a well-formed
//! tree or `None`.
//!
//! Normalization runs two passes:
//!
//! - the structural pass flattens and collapses `And`/`Or`, bounds nested scopes
//!   and negations, removes unconstrained negations and inverts negated scopes
//! - the placement pass, only when a placement rule is active, removes scopes
//!   below the first level, under `Or`/`Not`, or under a negation
//!
//! The passes repeat until the tree stops changing. Each round that changes the
//! tree makes it smaller or moves a negation below a scope, so the loop ends,
//! and normalizing a normalized tree returns it unchanged.

use tracing::debug;

use crate::{
    ast::{Connective, Node},
    config::{NotScope, Policy},
};

/// An enclosing operator, as seen from a node being normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Ancestor {
    /// Inside a conjunction.
    And,
    /// Inside a disjunction.
    Or,
    /// Inside a negation.
    Not,
    /// Inside the named scope.
    Scope(String),
}

impl From<Connective> for Ancestor {
    fn from(op: Connective) -> Self {
        match op {
            Connective::And => Self::And,
            Connective::Or => Self::Or,
        }
    }
}

/// Applies a normalization policy to parse trees.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    /// Policy in effect.
    policy: Policy,
}

impl Normalizer {
    /// Creates a normalizer enforcing the given policy.
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    /// Returns the policy in effect.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Normalizes a tree, returning `None` when nothing survives the policy.
    pub fn normalize(&self, node: Node) -> Option<Node> {
        let size = node.size();
        let max_rounds = size.saturating_mul(size).saturating_add(4);
        let mut current = node;

        for _ in 0..max_rounds {
            let next = self.round(current.clone())?;
            if next == current {
                return Some(next);
            }
            current = next;
        }

        debug!("normalization did not settle, returning last round");
        Some(current)
    }

    /// Runs the structural pass and, if needed, the placement pass once.
    fn round(&self, node: Node) -> Option<Node> {
        let shaped = self.structure(node, &mut Vec::new(), false)?;
        if self.policy.needs_placement_pass() {
            self.place(shaped, &mut Vec::new())
        } else {
            Some(shaped)
        }
    }

    /// Structural pass.
    ///
    /// `constrained` is true once an enclosing `And` has a constraining child,
    /// which is what lets a negation below it survive.
    fn structure(
        &self,
        node: Node,
        ancestors: &mut Vec<Ancestor>,
        constrained: bool,
    ) -> Option<Node> {
        match node {
            Node::Term(text) => Some(Node::Term(text)),
            Node::Phrase(terms) => {
                if terms.is_empty() {
                    None
                } else {
                    Some(Node::Phrase(terms))
                }
            }
            Node::And(children) => self.structure_and(children, ancestors, constrained),
            Node::Or(children) => {
                self.structure_children(Connective::Or, children, ancestors, constrained)
            }
            Node::Scope { name, child } => {
                self.structure_scope(name, *child, ancestors, constrained)
            }
            Node::Not(child) => self.structure_not(*child, ancestors, constrained),
        }
    }

    /// Normalizes the children of a variadic node and rebuilds it.
    fn structure_children(
        &self,
        op: Connective,
        children: Vec<Node>,
        ancestors: &mut Vec<Ancestor>,
        constrained: bool,
    ) -> Option<Node> {
        ancestors.push(Ancestor::from(op));
        let normalized: Vec<Node> = children
            .into_iter()
            .filter_map(|child| self.structure(child, ancestors, constrained))
            .collect();
        ancestors.pop();
        Node::variadic(op, normalized)
    }

    /// Normalizes a conjunction, constraining its subtree when a child qualifies.
    fn structure_and(
        &self,
        children: Vec<Node>,
        ancestors: &mut Vec<Ancestor>,
        constrained: bool,
    ) -> Option<Node> {
        let scope_is_constraint = self.policy.scope_is_constraint;
        let has_constraint = children
            .iter()
            .any(|c| c.is_constraint(scope_is_constraint));
        if constrained || !has_constraint {
            return self.structure_children(Connective::And, children, ancestors, constrained);
        }

        // The constraining child may itself be removed; check the result and
        // redo the children unconstrained if nothing constraining survived.
        let optimistic =
            self.structure_children(Connective::And, children.clone(), ancestors, true);
        if optimistic
            .as_ref()
            .is_some_and(|n| n.is_constraint(scope_is_constraint))
        {
            return optimistic;
        }
        self.structure_children(Connective::And, children, ancestors, false)
    }

    /// Normalizes a scope node.
    fn structure_scope(
        &self,
        name: String,
        child: Node,
        ancestors: &mut Vec<Ancestor>,
        constrained: bool,
    ) -> Option<Node> {
        if !self.policy.allow_nested_scope {
            let enclosing = ancestors.iter().rev().find_map(|a| match a {
                Ancestor::Scope(outer) => Some(outer.as_str()),
                _ => None,
            });
            match enclosing {
                Some(outer) if outer == name => {
                    return self.structure(child, ancestors, constrained);
                }
                Some(outer) => {
                    debug!(scope = %name, enclosing = %outer, "dropping nested scope");
                    return None;
                }
                None => {}
            }
        }

        ancestors.push(Ancestor::Scope(name.clone()));
        let inner = self.structure(child, ancestors, constrained);
        ancestors.pop();
        inner.map(|c| Node::scope(name, c))
    }

    /// Normalizes a negation.
    fn structure_not(
        &self,
        child: Node,
        ancestors: &mut Vec<Ancestor>,
        constrained: bool,
    ) -> Option<Node> {
        if !self.policy.allow_unconstrained_not && !constrained {
            debug!("dropping unconstrained negation");
            return None;
        }
        if !self.policy.allow_nested_not && ancestors.contains(&Ancestor::Not) {
            debug!("dropping nested negation");
            return None;
        }
        if self.policy.not_scope != NotScope::Invert {
            return self.negate(child, ancestors, constrained);
        }

        // Normalized without this negation on the stack, so the scope check
        // inside does not see the negation being inverted.
        if self.policy.allow_nested_not {
            // Only the nested-negation check reads a `Not` ancestor, so this
            // result is also the normalized child of the negation.
            return match self.structure(child, ancestors, constrained)? {
                Node::Scope { name, child: inner } => {
                    self.invert(name, *inner, ancestors, constrained)
                }
                other => Some(Node::not(other)),
            };
        }
        match self.structure(child.clone(), ancestors, constrained)? {
            Node::Scope { name, child: inner } => self.invert(name, *inner, ancestors, constrained),
            // Redone with the negation visible so negations below it are dropped.
            _ => self.negate(child, ancestors, constrained),
        }
    }

    /// Wraps the normalized child in a negation.
    fn negate(
        &self,
        child: Node,
        ancestors: &mut Vec<Ancestor>,
        constrained: bool,
    ) -> Option<Node> {
        ancestors.push(Ancestor::Not);
        let inner = self.structure(child, ancestors, constrained);
        ancestors.pop();
        inner.map(Node::not)
    }

    /// Moves a negation below a scope, continuing through directly nested scopes.
    fn invert(
        &self,
        name: String,
        child: Node,
        ancestors: &mut Vec<Ancestor>,
        constrained: bool,
    ) -> Option<Node> {
        ancestors.push(Ancestor::Scope(name.clone()));
        let negated = self.structure_not(child, ancestors, constrained);
        ancestors.pop();
        negated.map(|n| Node::scope(name, n))
    }

    /// Placement pass.
    fn place(&self, node: Node, ancestors: &mut Vec<Ancestor>) -> Option<Node> {
        match node {
            leaf @ (Node::Term(_) | Node::Phrase(_)) => Some(leaf),
            Node::And(children) => self.place_children(Connective::And, children, ancestors),
            Node::Or(children) => self.place_children(Connective::Or, children, ancestors),
            Node::Not(child) => {
                ancestors.push(Ancestor::Not);
                let inner = self.place(*child, ancestors);
                ancestors.pop();
                inner.map(Node::not)
            }
            Node::Scope { name, child } => {
                if !self.scope_allowed_at(ancestors) {
                    debug!(scope = %name, "dropping misplaced scope");
                    return None;
                }
                ancestors.push(Ancestor::Scope(name.clone()));
                let inner = self.place(*child, ancestors);
                ancestors.pop();
                inner.map(|c| Node::scope(name, c))
            }
        }
    }

    /// Places the children of a variadic node and rebuilds it.
    fn place_children(
        &self,
        op: Connective,
        children: Vec<Node>,
        ancestors: &mut Vec<Ancestor>,
    ) -> Option<Node> {
        ancestors.push(Ancestor::from(op));
        let placed: Vec<Node> = children
            .into_iter()
            .filter_map(|child| self.place(child, ancestors))
            .collect();
        ancestors.pop();
        Node::variadic(op, placed)
    }

    /// Whether a scope may appear under the given ancestors.
    fn scope_allowed_at(&self, ancestors: &[Ancestor]) -> bool {
        if self.policy.scope_top_only && ancestors.len() > 1 {
            return false;
        }
        if self.policy.scope_and_only
            && ancestors
                .iter()
                .any(|a| matches!(a, Ancestor::Or | Ancestor::Not))
        {
            return false;
        }
        // Under Invert, scopes that could be inverted already moved above their
        // negation; the ones left cannot be expressed.
        !(self.policy.not_scope != NotScope::Allow && ancestors.contains(&Ancestor::Not))
    }
}
