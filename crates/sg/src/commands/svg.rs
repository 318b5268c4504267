//! `sg svg` command implementation.

use std::path::PathBuf;

use clap::Args;
use sg_config::CliSettings;
use sg_diagrams::{RailroadClient, RenderConfig, render_all};
use sg_spec::SpecSet;
use tracing::info;

use super::{GlobalArgs, name_filter};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the svg command.
#[derive(Args, Debug)]
pub(crate) struct SvgArgs {
    /// Directory holding `<name>.bnf` files.
    bnf_dir: PathBuf,

    /// Directory receiving `<name>.html` diagrams.
    svg_dir: PathBuf,

    /// Location of the specification document; a path or an http address (overrides config).
    #[arg(long)]
    spec: Option<String>,

    /// Maximum number of concurrent render jobs (overrides config).
    #[arg(long)]
    max_workers: Option<usize>,

    /// Stop starting new render jobs after the first failure.
    #[arg(long)]
    fail_fast: bool,
}

impl SvgArgs {
    /// Execute the svg command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or specification loading fails, a
    /// fragment has no specification entry, or any diagram fails to render.
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new(global.quiet);

        let cli_settings = CliSettings {
            spec: self.spec,
            max_workers: self.max_workers,
            fail_fast: self.fail_fast.then_some(true),
            ..global.cli_settings()
        };
        let config = global.load_config(&cli_settings)?;
        let specs = SpecSet::load(&config.grammar.spec)?;

        output.info(&format!("Fragments: {}", self.bnf_dir.display()));
        output.info(&format!("Output: {}", self.svg_dir.display()));

        let diagrams = &config.diagrams;
        let client = RailroadClient::new(diagrams.renderer_url.clone(), diagrams.timeout());
        let render_config = RenderConfig {
            bnf_dir: self.bnf_dir,
            svg_dir: self.svg_dir,
            filter: name_filter(&config)?,
            max_workers: diagrams.max_workers,
            pool_threads: None,
            fail_fast: diagrams.fail_fast,
            reference_doc: diagrams.reference_doc.clone(),
        };

        let report = render_all(&render_config, &specs, &client)?;
        info!(
            "Rendered {} diagrams with at most {} in flight",
            report.written.len(),
            report.peak_in_flight
        );

        output.success(&format!("Rendered {} diagrams", report.written.len()));
        Ok(())
    }
}
