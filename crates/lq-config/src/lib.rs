//! Configuration system for lq.
//!
//! lq reads TOML files named `.lq.toml`. Configuration is resolved by walking up
//! the directory tree from the working directory, collecting every `.lq.toml`
//! found, then loading `~/.lq.toml` with the lowest precedence. The merged
//! settings convert into the [`ParserConfig`] and [`Policy`] used by `lq-query`.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod templates;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
use lq_query::{
    Connective, Matcher, OperatorKind, ParserConfig, ParserConfigBuilder, Pipeline, Policy,
    Precedence,
};
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawConfig, RawNormalizerSettings, RawParserSettings, is_root_config, parse_config_file,
    parse_config_str,
};
use serde::{Deserialize, Serialize};
pub use templates::config_template;

/// Merged configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parser settings.
    pub parser: ParserSettings,
    /// Tree normalizer policy.
    pub normalizer: Policy,
}

impl Config {
    /// Loads configuration by discovering and merging every relevant `.lq.toml`.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        Self::load_from_files(&discover_config_files(cwd))
    }

    /// Loads configuration from an explicit list of files, highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let parsed = files
            .iter()
            .map(|path| {
                Ok(ParsedConfig {
                    path: path.clone(),
                    config: parse_config_file(path)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(merge_configs(&parsed))
    }

    /// Returns a parser configuration builder populated from the settings.
    ///
    /// Callers can add hooks before building.
    pub fn parser_builder(&self) -> Result<ParserConfigBuilder, ConfigError> {
        let p = &self.parser;
        let mut builder = ParserConfig::builder()
            .default_operator(p.default_operator)
            .or(matcher(&p.or)?)
            .and(matcher(&p.and)?)
            .not(matcher(&p.not)?)
            .quote(matcher(&p.quote)?)
            .parens(matcher(&p.open_paren)?, matcher(&p.close_paren)?)
            .infix(p.infix.chars())
            .prefix(p.prefix.chars())
            .scopes(&p.scopes)
            .case_sensitive_scopes(p.case_sensitive_scopes);

        if !p.precedence.is_empty() {
            builder = builder.precedence(p.precedence_table()?);
        }
        Ok(builder)
    }

    /// Builds the parser configuration described by the settings.
    pub fn parser_config(&self) -> Result<ParserConfig, ConfigError> {
        Ok(self.parser_builder()?.build()?)
    }

    /// Returns the normalizer policy.
    pub fn policy(&self) -> Policy {
        self.normalizer
    }

    /// Builds the full parse-and-normalize pipeline.
    pub fn pipeline(&self) -> Result<Pipeline, ConfigError> {
        Ok(Pipeline::new(self.parser_config()?, self.policy()))
    }

    /// Serializes the effective settings in `.lq.toml` format.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        let serializable = SerializableConfig {
            parser: &self.parser,
            normalizer: &self.normalizer,
        };
        Ok(toml::to_string_pretty(&serializable)?)
    }
}

/// Compiles a token list into a matcher.
fn matcher(specs: &[String]) -> Result<Matcher, ConfigError> {
    Ok(Matcher::from_specs(specs)?)
}

/// Parser settings after merging.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ParserSettings {
    /// Operator inserted between adjacent terms.
    pub default_operator: OperatorKind,
    /// OR tokens.
    pub or: Vec<String>,
    /// AND tokens.
    pub and: Vec<String>,
    /// NOT tokens.
    pub not: Vec<String>,
    /// Quote tokens.
    pub quote: Vec<String>,
    /// Opening parenthesis tokens.
    pub open_paren: Vec<String>,
    /// Closing parenthesis tokens.
    pub close_paren: Vec<String>,
    /// Characters split into their own token.
    pub infix: String,
    /// Characters split off the start of a word.
    pub prefix: String,
    /// Recognized scope names.
    pub scopes: Vec<String>,
    /// Whether scope names must match case exactly.
    pub case_sensitive_scopes: bool,
    /// Precedence overrides; empty means derived from the default operator.
    pub precedence: BTreeMap<String, i32>,
}

impl ParserSettings {
    /// Builds the precedence table, starting from the default-operator table.
    fn precedence_table(&self) -> Result<Precedence, ConfigError> {
        let default = match self.default_operator {
            OperatorKind::Or => Connective::Or,
            _ => Connective::And,
        };
        self.precedence
            .iter()
            .try_fold(Precedence::for_default(default), |table, (key, value)| {
                let kind = key
                    .parse::<OperatorKind>()
                    .map_err(|message| ConfigError::InvalidValue {
                        key: format!("parser.precedence.{key}"),
                        message,
                    })?;
                Ok(table.with(kind, *value))
            })
    }
}

impl Default for ParserSettings {
    fn default() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| (*s).to_string()).collect();
        Self {
            default_operator: OperatorKind::And,
            or: list(&["|", "OR"]),
            and: list(&["&", "AND"]),
            not: list(&["-", "NOT"]),
            quote: list(&["\""]),
            open_paren: list(&["("]),
            close_paren: list(&[")"]),
            infix: String::from("()\"|&"),
            prefix: String::from("-"),
            scopes: Vec::new(),
            case_sensitive_scopes: false,
            precedence: BTreeMap::new(),
        }
    }
}

/// Effective settings in file layout, for `to_toml`.
#[derive(Serialize)]
struct SerializableConfig<'a> {
    /// `[parser]` section.
    parser: &'a ParserSettings,
    /// `[normalizer]` section.
    normalizer: &'a Policy,
}
