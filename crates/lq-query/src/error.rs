//! Error types for query configuration and rendering.
//!
//! Parsing and normalization are total: malformed input never produces an error.
//! The only failures are configuration mistakes, caught when a configuration is
//! built, and rendering into a backend that cannot express a tree.

use thiserror::Error;

use crate::config::OperatorKind;

/// Errors raised while building a parser configuration.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The default operator must be `And` or `Or`.
    #[error("invalid default operator {0:?}: expected And or Or")]
    InvalidDefaultOperator(OperatorKind),

    /// A token pattern failed to compile.
    #[error("invalid token pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern text.
        pattern: String,
        /// Underlying regex error.
        source: regex::Error,
    },
}

/// Errors raised when a tree cannot be expressed in a target syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A negation has no positive sibling to subtract from.
    #[error("negation without a positive term cannot be expressed in this syntax")]
    UnconstrainedNot,
}

impl RenderError {
    /// Returns a hint for resolving the error.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::UnconstrainedNot => {
                "Combine the negation with a positive term, e.g. 'rust -deprecated'"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_operator_message() {
        let err = QueryError::InvalidDefaultOperator(OperatorKind::Not);
        assert!(err.to_string().contains("Not"));
        assert!(err.to_string().contains("expected And or Or"));
    }

    #[test]
    fn render_error_suggestion() {
        let err = RenderError::UnconstrainedNot;
        assert!(err.to_string().contains("negation"));
        assert!(err.suggestion().contains("positive term"));
    }
}
