//! Configuration file parsing.
//!
//! Parses one `.lq.toml` file into a [`RawConfig`] whose fields are all optional,
//! so that partially specified files can be merged.

use std::{collections::BTreeMap, fs, path::Path};

use lq_query::{NotScope, OperatorKind};
use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    /// When true, stop discovery here and ignore parent and global configs.
    pub root: Option<bool>,
    /// `[parser]` section.
    pub parser: Option<RawParserSettings>,
    /// `[normalizer]` section.
    pub normalizer: Option<RawNormalizerSettings>,
}

/// Raw `[parser]` section.
///
/// Token lists accept either a single string or an array. Entries written as
/// `r/.../` are regular expressions matched against whole tokens.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawParserSettings {
    /// Operator inserted between adjacent terms (`and` or `or`).
    pub default_operator: Option<OperatorKind>,
    /// OR tokens.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub or: Option<Vec<String>>,
    /// AND tokens.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub and: Option<Vec<String>>,
    /// NOT tokens.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub not: Option<Vec<String>>,
    /// Quote tokens.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub quote: Option<Vec<String>>,
    /// Opening parenthesis tokens.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub open_paren: Option<Vec<String>>,
    /// Closing parenthesis tokens.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub close_paren: Option<Vec<String>>,
    /// Characters split into their own token, as one string.
    pub infix: Option<String>,
    /// Characters split off the front of words, as one string.
    pub prefix: Option<String>,
    /// Recognized scope names.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub scopes: Option<Vec<String>>,
    /// Whether scope names must match case exactly.
    pub case_sensitive_scopes: Option<bool>,
    /// Operator precedence overrides keyed by `and`, `or`, `not` or `scope`.
    pub precedence: Option<BTreeMap<String, i32>>,
}

/// Raw `[normalizer]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawNormalizerSettings {
    /// Keep scopes nested inside other scopes.
    pub allow_nested_scope: Option<bool>,
    /// Keep negations nested inside other negations.
    pub allow_nested_not: Option<bool>,
    /// Keep negations without a constraining sibling.
    pub allow_unconstrained_not: Option<bool>,
    /// Whether a scope counts as a constraint.
    pub scope_is_constraint: Option<bool>,
    /// Treatment of scopes under a negation.
    pub not_scope: Option<NotScope>,
    /// Only allow scopes under `And`.
    pub scope_and_only: Option<bool>,
    /// Only allow scopes at the top level or one level deep.
    pub scope_top_only: Option<bool>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string; `path` is only used in errors.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Checks whether a config file sets `root = true`.
///
/// Unreadable or malformed files are not roots; the error surfaces later when
/// the file is loaded.
pub fn is_root_config(path: &Path) -> bool {
    parse_config_file(path).is_ok_and(|config| config.root == Some(true))
}
