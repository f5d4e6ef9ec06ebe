//! Command implementations and dispatch.

pub mod config;
pub mod init;
pub mod parse;
pub mod render;
pub mod tokens;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: &Commands, ctx: &CommandContext) -> ExitCode {
    match command {
        Commands::Parse(cmd) => parse::run(ctx, cmd),
        Commands::Tokens(cmd) => tokens::run(ctx, cmd),
        Commands::Render(cmd) => render::run(ctx, cmd),
        Commands::Config => config::run(ctx),
        Commands::Init(cmd) => init::run(ctx, cmd),
    }
}
