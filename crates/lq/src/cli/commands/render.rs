//! Implementation of `lq render`.

use std::process::ExitCode;

use lq_query::{
    Policy,
    render::{Fts5Renderer, GenericRenderer, Renderer, sanitize_term},
};

use crate::cli::{
    args::{RenderCommand, Target},
    context::CommandContext,
};

/// Renders the normalized query in the selected backend syntax.
pub fn run(ctx: &CommandContext, cmd: &RenderCommand) -> ExitCode {
    let rendered = match cmd.target {
        Target::Generic => {
            let pipeline = match ctx.pipeline() {
                Ok(p) => p,
                Err(code) => return code,
            };
            let renderer = GenericRenderer::new(pipeline.parser.config());
            pipeline.run(&cmd.query).map(|node| renderer.render(&node))
        }
        Target::Fts5 => {
            // FTS5 NOT is binary, so a negation needs a positive sibling.
            let policy = Policy {
                allow_unconstrained_not: false,
                ..ctx.config.policy()
            };
            let pipeline = match ctx.pipeline_with(policy, sanitize_term) {
                Ok(p) => p,
                Err(code) => return code,
            };
            pipeline
                .run(&cmd.query)
                .map(|node| Fts5Renderer::new().render(&node))
        }
    };

    match rendered {
        Some(Ok(text)) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Some(Err(e)) => {
            eprintln!("error: {e}");
            eprintln!("hint: {}", e.suggestion());
            ExitCode::FAILURE
        }
        None => {
            eprintln!("warning: query is empty, nothing to render");
            ExitCode::SUCCESS
        }
    }
}
