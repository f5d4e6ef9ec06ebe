//! lq: lenient query tool
//!
//! Turns free-form user search text into a well-formed boolean query tree and
//! renders it for a search backend. Malformed input is never an error: stray
//! operators and unmatched delimiters are dropped.

#![warn(missing_docs)]

pub mod cli;
