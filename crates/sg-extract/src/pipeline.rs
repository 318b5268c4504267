//! Specification-driven BNF extraction.

use std::path::{Path, PathBuf};

use sg_grammar::{ExtractOptions, Grammar, generate_bnf, parse_grammar};
use sg_spec::{Filter, SpecSet, StmtSpec, TOP_LEVEL, load_resource};
use tracing::{debug, info, warn};

use crate::error::ExtractError;
use crate::preprocess::Preprocessor;
use crate::rewrite::{apply_cosmetics, apply_replacements};

/// Extension of extracted fragment files.
pub const BNF_EXTENSION: &str = "bnf";

/// Settings for an extraction run.
#[derive(Debug, Clone, Default)]
pub struct ExtractConfig {
    /// Directory receiving `<name>.bnf` files.
    pub output_dir: PathBuf,
    /// Which names to process.
    pub filter: Filter,
    /// Grammar source normalizer.
    pub preprocessor: Preprocessor,
}

/// Outcome of a successful extraction run.
#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Files written, in processing order.
    pub written: Vec<PathBuf>,
}

/// Sequential extraction pipeline.
///
/// Runs strictly in order and stops at the first failure; files written
/// before the failure are left in place.
pub struct ExtractPipeline {
    config: ExtractConfig,
}

impl ExtractPipeline {
    #[must_use]
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Fetch, preprocess and read the grammar at `addr`, then extract.
    ///
    /// The preprocessed grammar lives in a scratch file that is removed when
    /// this returns, whether or not extraction succeeded.
    pub fn run(&self, addr: &str, specs: &SpecSet) -> Result<ExtractReport, ExtractError> {
        let raw = String::from_utf8(load_resource(addr)?)?;
        let scratch = self.config.preprocessor.write_scratch(&raw)?;
        let bnf = generate_bnf(scratch.path())?;
        self.extract_all(&bnf, specs)
    }

    /// Extract the top-level production and every specification entry.
    ///
    /// The top-level production comes first, with descent and without line
    /// splitting; entries follow in document order.
    pub fn extract_all(&self, bnf: &str, specs: &SpecSet) -> Result<ExtractReport, ExtractError> {
        let grammar = parse_grammar(bnf)?;
        let mut report = ExtractReport::default();

        if self.config.filter.matches(TOP_LEVEL) {
            info!("processing {TOP_LEVEL}");
            let options = ExtractOptions {
                descend: true,
                nosplit: true,
                ..Default::default()
            };
            let text = grammar
                .extract_production(TOP_LEVEL, options)
                .map_err(|source| ExtractError::Extraction {
                    name: TOP_LEVEL.to_owned(),
                    source,
                })?;
            let text = apply_cosmetics(&text);
            report.written.push(self.write(TOP_LEVEL, &text)?);
        }

        for spec in specs {
            if spec.name == TOP_LEVEL {
                warn!("Ignoring specification for reserved name {TOP_LEVEL}");
                continue;
            }
            if !self.config.filter.matches(&spec.name) {
                continue;
            }
            info!("processing {}", spec.name);
            let text = extract_spec(&grammar, spec)?;
            report.written.push(self.write(&spec.name, &text)?);
        }

        Ok(report)
    }

    fn write(&self, name: &str, text: &str) -> Result<PathBuf, ExtractError> {
        let path = self
            .config
            .output_dir
            .join(format!("{name}.{BNF_EXTENSION}"));
        write_file(&path, text)?;
        Ok(path)
    }
}

/// Extract and rewrite one specification entry.
fn extract_spec(grammar: &Grammar, spec: &StmtSpec) -> Result<String, ExtractError> {
    let extraction_err = |source| ExtractError::Extraction {
        name: spec.name.clone(),
        source,
    };

    let inlined;
    let grammar = if spec.inline.is_empty() {
        grammar
    } else {
        let mut copy = grammar.clone();
        copy.inline(&spec.inline).map_err(extraction_err)?;
        inlined = copy;
        &inlined
    };

    let options = ExtractOptions {
        descend: false,
        nosplit: spec.nosplit,
        matches: &spec.matches,
        exclude: &spec.exclude,
    };
    let raw = grammar
        .extract_production(&spec.stmt, options)
        .map_err(extraction_err)?;
    let text = apply_cosmetics(&raw);
    debug!("{}: raw data:\n{text}", spec.name);

    let text = apply_replacements(text, spec);
    debug!("{}: result:\n{text}", spec.name);
    Ok(text)
}

fn write_file(path: &Path, text: &str) -> Result<(), ExtractError> {
    let write_err = |source| ExtractError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, text).map_err(write_err)
}
