//! `sg bnf` command implementation.

use std::path::PathBuf;

use clap::Args;
use sg_config::{CliSettings, PreprocessConfig, SubstitutionEntry};
use sg_extract::{
    ExtractConfig, ExtractPipeline, Preprocessor, Substitution, default_fixups, default_operators,
};
use sg_spec::SpecSet;

use super::{GlobalArgs, name_filter};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the bnf command.
#[derive(Args, Debug)]
pub(crate) struct BnfArgs {
    /// Directory receiving `<name>.bnf` files.
    output_dir: PathBuf,

    /// Location of the grammar source; a path or an http address (overrides config).
    #[arg(long)]
    addr: Option<String>,

    /// Location of the specification document; a path or an http address (overrides config).
    #[arg(long)]
    spec: Option<String>,
}

impl BnfArgs {
    /// Execute the bnf command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, specification loading or any
    /// extraction fails.
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new(global.quiet);

        let cli_settings = CliSettings {
            addr: self.addr,
            spec: self.spec,
            ..global.cli_settings()
        };
        let config = global.load_config(&cli_settings)?;
        let specs = SpecSet::load(&config.grammar.spec)?;

        output.info(&format!("Grammar: {}", config.grammar.addr));
        output.info(&format!("Output: {}", self.output_dir.display()));

        let pipeline = ExtractPipeline::new(ExtractConfig {
            output_dir: self.output_dir,
            filter: name_filter(&config)?,
            preprocessor: preprocessor(&config.preprocess),
        });
        let report = pipeline.run(&config.grammar.addr, &specs)?;

        output.success(&format!("Extracted {} BNF files", report.written.len()));
        Ok(())
    }
}

/// Build the preprocessor, falling back to the built-in tables.
fn preprocessor(config: &PreprocessConfig) -> Preprocessor {
    let table = |entries: Option<&Vec<SubstitutionEntry>>, builtin: fn() -> Vec<Substitution>| {
        entries.map_or_else(builtin, |entries| {
            entries
                .iter()
                .map(|e| Substitution::new(&e.from, &e.to))
                .collect()
        })
    };
    Preprocessor::new(
        table(config.operators.as_ref(), default_operators),
        table(config.fixups.as_ref(), default_fixups),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_tables_by_default() {
        let pre = preprocessor(&PreprocessConfig::default());
        assert_eq!(
            pre.preprocess("%%\nStart: a \"<=>\" \"b\"").unwrap(),
            "Start: a '<=>' b"
        );
    }

    #[test]
    fn test_configured_table_replaces_builtin() {
        let config = PreprocessConfig {
            operators: Some(vec![SubstitutionEntry {
                from: "=>".to_owned(),
                to: "'=>'".to_owned(),
            }]),
            fixups: Some(Vec::new()),
        };
        let pre = preprocessor(&config);
        assert_eq!(
            pre.preprocess("Start: a => \"b\"").unwrap(),
            "Start: a '=>' \"b\""
        );
    }
}
