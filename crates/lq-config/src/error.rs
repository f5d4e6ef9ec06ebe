//! Error types for lq configuration.

use std::{io, path::PathBuf};

use lq_query::QueryError;
use thiserror::Error;
use toml::{de, ser};

/// Errors that can occur when loading or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// A setting holds a value that cannot be used.
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// Dotted key of the setting.
        key: String,
        /// What is wrong with it.
        message: String,
    },

    /// The settings do not form a valid parser configuration.
    #[error("invalid parser configuration: {0}")]
    Query(#[from] QueryError),

    /// Failed to render the effective configuration.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] ser::Error),
}
