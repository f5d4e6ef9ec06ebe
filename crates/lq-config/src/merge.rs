//! Configuration merging.
//!
//! Folds parsed files into one [`Config`]. Files arrive nearest first; each
//! setting takes the value from the nearest file that defines it.

use std::path::PathBuf;

use lq_query::Policy;

use crate::{
    Config, ParserSettings,
    parse::{RawConfig, RawNormalizerSettings, RawParserSettings},
};

/// A parsed config file with its source path.
#[derive(Debug, Clone)]
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges configuration files, highest precedence first.
pub fn merge_configs(configs: &[ParsedConfig]) -> Config {
    let mut merged = Config::default();

    // Lowest precedence first, so nearer files overwrite.
    for parsed in configs.iter().rev() {
        if let Some(raw) = &parsed.config.parser {
            apply_parser(&mut merged.parser, raw);
        }
        if let Some(raw) = &parsed.config.normalizer {
            apply_normalizer(&mut merged.normalizer, raw);
        }
    }
    merged
}

/// Overwrites parser settings with every value the raw section defines.
fn apply_parser(result: &mut ParserSettings, raw: &RawParserSettings) {
    if let Some(v) = raw.default_operator {
        result.default_operator = v;
    }
    let lists = [
        (&mut result.or, &raw.or),
        (&mut result.and, &raw.and),
        (&mut result.not, &raw.not),
        (&mut result.quote, &raw.quote),
        (&mut result.open_paren, &raw.open_paren),
        (&mut result.close_paren, &raw.close_paren),
        (&mut result.scopes, &raw.scopes),
    ];
    for (target, value) in lists {
        if let Some(v) = value {
            target.clone_from(v);
        }
    }
    if let Some(v) = &raw.infix {
        result.infix.clone_from(v);
    }
    if let Some(v) = &raw.prefix {
        result.prefix.clone_from(v);
    }
    if let Some(v) = raw.case_sensitive_scopes {
        result.case_sensitive_scopes = v;
    }
    // Precedence entries merge key by key.
    if let Some(table) = &raw.precedence {
        for (key, value) in table {
            result.precedence.insert(key.clone(), *value);
        }
    }
}

/// Overwrites policy switches with every value the raw section defines.
fn apply_normalizer(result: &mut Policy, raw: &RawNormalizerSettings) {
    let switches = [
        (&mut result.allow_nested_scope, raw.allow_nested_scope),
        (&mut result.allow_nested_not, raw.allow_nested_not),
        (&mut result.allow_unconstrained_not, raw.allow_unconstrained_not),
        (&mut result.scope_is_constraint, raw.scope_is_constraint),
        (&mut result.scope_and_only, raw.scope_and_only),
        (&mut result.scope_top_only, raw.scope_top_only),
    ];
    for (target, value) in switches {
        if let Some(v) = value {
            *target = v;
        }
    }
    if let Some(v) = raw.not_scope {
        result.not_scope = v;
    }
}
