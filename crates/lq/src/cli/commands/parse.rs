//! Implementation of `lq parse`.

use std::process::ExitCode;

use lq_query::Node;
use tracing::debug;

use crate::cli::{args::ParseCommand, context::CommandContext};

/// Parses the query and prints the resulting tree.
pub fn run(ctx: &CommandContext, cmd: &ParseCommand) -> ExitCode {
    let pipeline = match ctx.pipeline() {
        Ok(p) => p,
        Err(code) => return code,
    };

    let raw = pipeline.parser.parse(&cmd.query);
    debug!(raw = ?raw, "parsed");
    let node = if cmd.raw {
        raw
    } else {
        raw.and_then(|n| pipeline.normalizer.normalize(n))
    };

    if cmd.json {
        return print_json(node.as_ref());
    }

    match node {
        Some(node) => print!("{node}"),
        None => println!("(empty query)"),
    }
    ExitCode::SUCCESS
}

/// Prints the tree as JSON; an empty query is `null`.
fn print_json(node: Option<&Node>) -> ExitCode {
    match serde_json::to_string_pretty(&node) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}
