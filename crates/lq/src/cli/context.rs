//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use lq_config::{Config, ConfigError};
use lq_query::{ParserConfig, Pipeline, Policy};

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (may be default if no config files found).
    pub config: Config,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    ///
    /// With `config_file`, only that file is read and discovery is skipped.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = match config_file {
            Some(path) => Config::load_from_files(&[path.to_path_buf()]),
            None => Config::load(&cwd),
        }
        .map_err(|e| {
            eprintln!("error: failed to load configuration: {e}");
            ExitCode::FAILURE
        })?;
        Ok(Self { cwd, config })
    }

    /// Loads only the current directory, skipping configuration parsing.
    ///
    /// Used for `init`, which should work even when an existing config file is
    /// invalid.
    pub fn load_cwd_only() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        Ok(Self {
            cwd,
            config: Config::default(),
        })
    }

    /// Builds the parser configuration from the loaded settings.
    pub fn parser_config(&self) -> Result<ParserConfig, ExitCode> {
        self.config.parser_config().map_err(|e| report_invalid(&e))
    }

    /// Builds the configured parse-and-normalize pipeline.
    pub fn pipeline(&self) -> Result<Pipeline, ExitCode> {
        Ok(Pipeline::new(self.parser_config()?, self.config.policy()))
    }

    /// Builds a pipeline with a different policy and extra parser hooks.
    pub fn pipeline_with<F>(&self, policy: Policy, hook: F) -> Result<Pipeline, ExitCode>
    where
        F: Fn(&str) -> Option<String> + Clone + Send + Sync + 'static,
    {
        let config = self
            .config
            .parser_builder()
            .and_then(|b| Ok(b.term_hook(hook.clone()).phrase_hook(hook).build()?))
            .map_err(|e| report_invalid(&e))?;
        Ok(Pipeline::new(config, policy))
    }
}

/// Prints a configuration error and maps it to a failure exit code.
fn report_invalid(e: &ConfigError) -> ExitCode {
    eprintln!("error: invalid configuration: {e}");
    ExitCode::FAILURE
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}
