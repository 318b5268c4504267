//! Bounded parallel rendering of extracted fragments.
//!
//! Fragments are discovered in the input directory, matched to their
//! specification entries, and rendered on a dedicated rayon pool. An
//! [`AdmissionGate`] caps the number of jobs in flight at `max_workers`.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use sg_spec::{Filter, SpecSet, StmtSpec, TOP_LEVEL};
use tracing::{debug, info};

use crate::error::{DiagramError, RenderError, RenderErrorKind};
use crate::gate::AdmissionGate;
use crate::html::xhtml_to_html;
use crate::links::{DEFAULT_REFERENCE_DOC, statement_body, top_level_body};
use crate::railroad::DiagramRenderer;

/// Extension of fragment files read from the input directory.
const FRAGMENT_EXTENSION: &str = "bnf";

/// Extension of written diagram files.
pub const HTML_EXTENSION: &str = "html";

/// Settings for a rendering run.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Directory holding `<name>.bnf` fragments.
    pub bnf_dir: PathBuf,
    /// Directory receiving `<name>.html` diagrams.
    pub svg_dir: PathBuf,
    pub filter: Filter,
    /// Maximum number of jobs in flight.
    pub max_workers: usize,
    /// Threads in the render pool; `None` sizes the pool to `max_workers`.
    pub pool_threads: Option<usize>,
    /// Skip jobs not yet started once any job has failed.
    pub fail_fast: bool,
    /// Document that diagram links point at.
    pub reference_doc: String,
}

impl RenderConfig {
    /// Sequential configuration with default link target and no filter.
    #[must_use]
    pub fn new(bnf_dir: impl Into<PathBuf>, svg_dir: impl Into<PathBuf>) -> Self {
        Self {
            bnf_dir: bnf_dir.into(),
            svg_dir: svg_dir.into(),
            filter: Filter::default(),
            max_workers: 1,
            pool_threads: None,
            fail_fast: false,
            reference_doc: DEFAULT_REFERENCE_DOC.to_owned(),
        }
    }
}

/// Outcome of a successful rendering run.
#[derive(Debug, Default)]
pub struct RenderReport {
    /// Diagrams written, in name order.
    pub written: Vec<PathBuf>,
    /// Highest number of jobs that were in flight at once.
    pub peak_in_flight: usize,
}

/// One fragment to render.
struct Job<'s> {
    name: String,
    source: PathBuf,
    spec: Option<&'s StmtSpec>,
}

/// Render every discovered fragment that passes the filter.
///
/// Non-top-level fragments must have a specification entry; a missing entry
/// aborts the run before anything is rendered. Job failures are collected
/// into [`DiagramError::Failed`] once all admitted jobs have finished.
pub fn render_all<R: DiagramRenderer>(
    config: &RenderConfig,
    specs: &SpecSet,
    renderer: &R,
) -> Result<RenderReport, DiagramError> {
    let jobs = plan(config, specs)?;
    if jobs.is_empty() {
        info!("No fragments to render in {}", config.bnf_dir.display());
        return Ok(RenderReport::default());
    }

    std::fs::create_dir_all(&config.svg_dir).map_err(|source| DiagramError::Output {
        path: config.svg_dir.clone(),
        source,
    })?;

    let workers = config.max_workers.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.pool_threads.unwrap_or(workers).max(1))
        .build()?;
    let gate = AdmissionGate::new(workers);
    let aborted = AtomicBool::new(false);

    let results: Vec<Option<Result<PathBuf, RenderError>>> = pool.install(|| {
        jobs.par_iter()
            .map(|job| {
                if config.fail_fast && aborted.load(Ordering::SeqCst) {
                    debug!("Skipping {} after earlier failure", job.name);
                    return None;
                }
                let _permit = gate.acquire();
                let result = render_job(config, renderer, job);
                if result.is_err() {
                    aborted.store(true, Ordering::SeqCst);
                }
                Some(result)
            })
            .collect()
    });

    let mut report = RenderReport {
        peak_in_flight: gate.peak(),
        ..Default::default()
    };
    let mut errors = Vec::new();
    for result in results.into_iter().flatten() {
        match result {
            Ok(path) => report.written.push(path),
            Err(error) => errors.push(error),
        }
    }

    if errors.is_empty() {
        Ok(report)
    } else {
        Err(DiagramError::Failed(errors))
    }
}

/// Discover, filter and match fragments to their specification entries.
fn plan<'s>(config: &RenderConfig, specs: &'s SpecSet) -> Result<Vec<Job<'s>>, DiagramError> {
    let mut jobs = Vec::new();
    for (name, source) in discover(&config.bnf_dir)? {
        if !config.filter.matches(&name) {
            continue;
        }
        let spec = if name == TOP_LEVEL {
            None
        } else {
            Some(
                specs
                    .get(&name)
                    .ok_or_else(|| DiagramError::UnmatchedSpec(name.clone()))?,
            )
        };
        jobs.push(Job { name, source, spec });
    }
    Ok(jobs)
}

/// List `*.bnf` files in `dir`, sorted by name.
pub fn discover(dir: &Path) -> Result<Vec<(String, PathBuf)>, DiagramError> {
    let discover_err = |source| DiagramError::Discover {
        path: dir.to_path_buf(),
        source,
    };

    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(discover_err)? {
        let path = entry.map_err(discover_err)?.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != FRAGMENT_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            found.push((stem.to_owned(), path));
        }
    }
    found.sort();
    Ok(found)
}

fn render_job<R: DiagramRenderer>(
    config: &RenderConfig,
    renderer: &R,
    job: &Job<'_>,
) -> Result<PathBuf, RenderError> {
    let fail = |kind| RenderError {
        name: job.name.clone(),
        kind,
    };
    info!("rendering {} ({})", job.name, job.source.display());

    let ebnf = std::fs::read_to_string(&job.source)
        .map_err(|e| fail(RenderErrorKind::Io(e.to_string())))?;
    let xhtml = renderer.render(&ebnf).map_err(fail)?;
    let html = xhtml_to_html(&xhtml).map_err(fail)?;

    let body = match job.spec {
        None => top_level_body(&html),
        Some(spec) => statement_body(&html, spec, &config.reference_doc),
    }
    .map_err(fail)?;

    let target = config
        .svg_dir
        .join(format!("{}.{HTML_EXTENSION}", job.name));
    std::fs::write(&target, body).map_err(|e| fail(RenderErrorKind::Io(e.to_string())))?;
    debug!("Wrote {}", target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_discover_lists_fragments_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.bnf", "Start.bnf", "a.bnf", "notes.txt"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.bnf")).unwrap();

        let names: Vec<String> = discover(dir.path())
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["Start", "a", "b"]);
    }

    #[test]
    fn test_discover_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, DiagramError::Discover { .. }));
    }

    #[test]
    fn test_plan_requires_spec_for_statements() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Start.bnf"), "x").unwrap();
        fs::write(dir.path().join("orphan.bnf"), "x").unwrap();
        let config = RenderConfig::new(dir.path(), dir.path().join("out"));

        let err = plan(&config, &SpecSet::default()).err().unwrap();
        assert_eq!(err.to_string(), "unfound spec: orphan");
    }

    #[test]
    fn test_plan_filter_skips_before_matching() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Start.bnf"), "x").unwrap();
        fs::write(dir.path().join("orphan.bnf"), "x").unwrap();
        let mut config = RenderConfig::new(dir.path(), dir.path().join("out"));
        config.filter = Filter::new("orphan", true).unwrap();

        let specs = SpecSet::default();
        let jobs = plan(&config, &specs).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "Start");
        assert!(jobs[0].spec.is_none());
    }
}
