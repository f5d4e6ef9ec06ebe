//! Implementation of `lq tokens`.

use std::process::ExitCode;

use lq_query::Lexer;

use crate::cli::{args::TokensCommand, context::CommandContext};

/// Prints the normalized token stream, one token per line.
pub fn run(ctx: &CommandContext, cmd: &TokensCommand) -> ExitCode {
    let config = match ctx.parser_config() {
        Ok(config) => config,
        Err(code) => return code,
    };
    for token in Lexer::new(&config).tokens(&cmd.query) {
        println!("{token}");
    }
    ExitCode::SUCCESS
}
