//! CLI command implementations.

pub(crate) mod bnf;
pub(crate) mod svg;

use std::path::PathBuf;

use clap::Args;
use sg_config::{CliSettings, Config};
use sg_spec::Filter;

use crate::error::CliError;

pub(crate) use bnf::BnfArgs;
pub(crate) use svg::SvgArgs;

/// Flags shared by every command.
#[derive(Args, Debug, Default)]
pub(crate) struct GlobalArgs {
    /// Only process names matching this regular expression.
    #[arg(long, global = true, value_name = "REGEX")]
    filter: Option<String>,

    /// Process names that do not match the filter instead.
    #[arg(long, global = true)]
    invert_match: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log substitutions and intermediate text.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file (default: auto-discover sg.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

impl GlobalArgs {
    /// Overrides common to all commands.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            filter: self.filter.clone(),
            invert_match: self.invert_match.then_some(true),
            ..CliSettings::default()
        }
    }

    /// Load configuration with the command's own overrides applied.
    fn load_config(&self, settings: &CliSettings) -> Result<Config, CliError> {
        Ok(Config::load(self.config.as_deref(), Some(settings))?)
    }

    /// Default log level when `RUST_LOG` is unset.
    pub(crate) fn log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Build the name filter from resolved configuration.
fn name_filter(config: &Config) -> Result<Filter, CliError> {
    Filter::new(&config.filter, config.invert_match)
        .map_err(|e| CliError::Validation(format!("invalid filter {:?}: {e}", config.filter)))
}
