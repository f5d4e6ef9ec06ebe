//! Clap argument definitions for the `lq` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "lq")]
#[command(about = "Lenient query parser - forgiving search syntax for any backend")]
pub struct Cli {
    /// Verbosity level (-v for debug, -vv for trace diagnostics)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Read settings from this file instead of discovering .lq.toml files
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for `lq parse`.
#[derive(Args, Debug, Clone)]
pub struct ParseCommand {
    /// Query text
    pub query: String,

    /// Show the parser output before tree normalization
    #[arg(long)]
    pub raw: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `lq tokens`.
#[derive(Args, Debug, Clone)]
pub struct TokensCommand {
    /// Query text
    pub query: String,
}

/// Backend syntax produced by `lq render`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// The configured query syntax itself
    #[default]
    Generic,
    /// SQLite FTS5 MATCH expression
    Fts5,
}

/// Arguments for `lq render`.
#[derive(Args, Debug, Clone)]
pub struct RenderCommand {
    /// Query text
    pub query: String,

    /// Output syntax
    #[arg(short = 't', long, value_enum, default_value_t = Target::Generic)]
    pub target: Target,
}

/// Arguments for `lq init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Supported `lq` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Parse a query and print its tree
    #[command(after_help = "\
QUERY SYNTAX (defaults):
  a b               Both terms (default operator AND)
  a | b, a OR b     Either term
  a & b, a AND b    Both terms, explicitly
  -a, NOT a         Term must not appear
  \"a b\"             Phrase
  (expr)            Grouping
  name:expr         Scope, for names listed in [parser] scopes

Malformed input is never an error. Dangling operators are dropped, and an
unmatched parenthesis or quote is ignored.

EXAMPLES:
  lq parse 'rust (async | tokio) -deprecated'
  lq parse --raw 'a | | b ('
  lq parse --json 'title:guide rust'
  lq parse -- '-draft notes'         Use -- before a query starting with -")]
    Parse(ParseCommand),

    /// Print the normalized token stream
    Tokens(TokensCommand),

    /// Render a query for a search backend
    Render(RenderCommand),

    /// Show effective configuration settings
    Config,

    /// Initialize lq configuration in current directory
    Init(InitCommand),
}
