//! Diagnostic logging setup.
//!
//! The core crates report ignored tokens and normalizer deletions through
//! `tracing`. Output goes to stderr so it never mixes with command output.

use std::io;

use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable overriding the verbosity flags.
pub const LOG_ENV: &str = "LQ_LOG";

/// Maps the `-v` count to a filter directive.
fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber.
///
/// `LQ_LOG` takes any `EnvFilter` directive, e.g. `LQ_LOG=lq_query::tree=debug`.
pub fn init(verbose: u8) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level_for(verbose)));

    if let Err(e) = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .without_time()
        .try_init()
    {
        eprintln!("warning: could not install logger: {e}");
    }
}
