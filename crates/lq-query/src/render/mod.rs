//! Rendering normalized trees into target query syntaxes.
//!
//! Renderers consume the output of the [`Normalizer`](crate::Normalizer); they do
//! not repair trees. A renderer whose target cannot express a tree reports a
//! [`RenderError`] and expects the caller to pick a stricter [`Policy`](crate::Policy).

mod fts5;
mod generic;

pub use fts5::{Fts5Renderer, sanitize_term};
pub use generic::GenericRenderer;

use crate::{ast::Node, error::RenderError};

/// Converts a query tree into a query string for some backend.
pub trait Renderer {
    /// Renders a tree.
    fn render(&self, node: &Node) -> Result<String, RenderError>;
}
