use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;
use sg_diagrams::{DiagramError, DiagramRenderer, RenderConfig, RenderErrorKind, render_all};
use sg_spec::{Filter, SpecFormat, SpecSet};

/// Renders each right-hand-side word as a linked box, like the real generator.
#[derive(Default)]
struct FakeRenderer {
    delay: Duration,
    calls: AtomicUsize,
    running: AtomicUsize,
    max_running: AtomicUsize,
}

impl FakeRenderer {
    fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }
}

impl DiagramRenderer for FakeRenderer {
    fn render(&self, ebnf: &str) -> Result<String, RenderErrorKind> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);
        thread::sleep(self.delay);
        self.running.fetch_sub(1, Ordering::SeqCst);

        let (name, rhs) = ebnf.split_once("::=").unwrap_or(("", ebnf));
        if rhs.contains("FAIL") {
            return Err(RenderErrorKind::Http("HTTP 500: generator down".to_owned()));
        }
        let links: Vec<String> = rhs
            .split_whitespace()
            .map(|w| {
                format!(r##"<svg:a xlink:href="#{w}" xlink:title="{w}"><svg:text>{w}</svg:text></svg:a>"##)
            })
            .collect();
        Ok(format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><body><p>{}:</p><svg:svg xmlns:svg="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">

    {}
</svg:svg><hr/><p>footer</p></body></html>"#,
            name.trim(),
            links.join("\n")
        ))
    }
}

fn specs(json: &str) -> SpecSet {
    SpecSet::parse(json.as_bytes(), SpecFormat::Json, "spec.json").unwrap()
}

fn fragments(dir: &Path, items: &[(&str, &str)]) {
    fs::create_dir_all(dir).unwrap();
    for (name, text) in items {
        fs::write(dir.join(format!("{name}.bnf")), text).unwrap();
    }
}

#[test]
fn renders_overview_and_statement_diagrams() {
    let dir = tempfile::tempdir().unwrap();
    let bnf = dir.path().join("bnf");
    let svg = dir.path().join("svg");
    fragments(
        &bnf,
        &[
            ("Start", "Start ::= stmt\n"),
            ("select", "select_stmt ::= SELECT expr FROM table_ref\n"),
        ],
    );
    let specs = specs(r#"[{"name": "select", "unlink": ["expr"], "relink": {"table_ref": "table"}}]"#);

    let report = render_all(&RenderConfig::new(&bnf, &svg), &specs, &FakeRenderer::default()).unwrap();

    assert_eq!(report.written, vec![svg.join("Start.html"), svg.join("select.html")]);
    assert_eq!(
        fs::read_to_string(svg.join("select.html")).unwrap(),
        r#"<div><svg>
<a xlink:href="sql-grammar.html#SELECT" xlink:title="SELECT"><text>SELECT</text></a>
<text>expr</text>
<a xlink:href="sql-grammar.html#FROM" xlink:title="FROM"><text>FROM</text></a>
<a xlink:href="sql-grammar.html#table" xlink:title="table"><text>table_ref</text></a>
</svg></div>
"#
    );
    assert_eq!(
        fs::read_to_string(svg.join("Start.html")).unwrap(),
        r##"<div><p>Start:</p><svg>

    <a xlink:href="#stmt" xlink:title="stmt"><text>stmt</text></a>
</svg><p>generated by <a href="http://www.bottlecaps.de/rr/ui" data-proofer-ignore>Railroad Diagram Generator</a></p></div>"##
    );
}

#[test]
fn custom_reference_document() {
    let dir = tempfile::tempdir().unwrap();
    let bnf = dir.path().join("bnf");
    let svg = dir.path().join("svg");
    fragments(&bnf, &[("s", "s ::= x\n")]);
    let mut config = RenderConfig::new(&bnf, &svg);
    config.reference_doc = "grammar.html".to_owned();

    render_all(&config, &specs(r#"[{"name": "s", "unlink": ["x"]}]"#), &FakeRenderer::default()).unwrap();

    assert_eq!(
        fs::read_to_string(svg.join("s.html")).unwrap(),
        "<div><svg>\n<text>x</text>\n</svg></div>\n"
    );
}

#[test]
fn unmatched_fragment_fails_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let bnf = dir.path().join("bnf");
    let svg = dir.path().join("svg");
    fragments(&bnf, &[("Start", "Start ::= a\n"), ("a", "a ::= A\n"), ("zzz", "zzz ::= Z\n")]);
    let renderer = FakeRenderer::default();

    let err = render_all(&RenderConfig::new(&bnf, &svg), &specs(r#"[{"name": "a"}]"#), &renderer)
        .unwrap_err();

    assert!(matches!(err, DiagramError::UnmatchedSpec(ref name) if name == "zzz"));
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
    assert!(!svg.exists());
}

#[test]
fn filter_selects_fragments() {
    let dir = tempfile::tempdir().unwrap();
    let bnf = dir.path().join("bnf");
    let svg = dir.path().join("svg");
    fragments(
        &bnf,
        &[("Start", "Start ::= a\n"), ("select_stmt", "s ::= S\n"), ("insert_stmt", "i ::= I\n")],
    );
    let specs = specs(r#"[{"name": "select_stmt"}, {"name": "insert_stmt"}]"#);

    let mut config = RenderConfig::new(&bnf, &svg);
    config.filter = Filter::new("^select", false).unwrap();
    let report = render_all(&config, &specs, &FakeRenderer::default()).unwrap();
    assert_eq!(report.written, vec![svg.join("select_stmt.html")]);

    config.filter = Filter::new("^select", true).unwrap();
    let report = render_all(&config, &specs, &FakeRenderer::default()).unwrap();
    assert_eq!(
        report.written,
        vec![svg.join("Start.html"), svg.join("insert_stmt.html")]
    );
}

#[test]
fn in_flight_jobs_never_exceed_max_workers() {
    let dir = tempfile::tempdir().unwrap();
    let bnf = dir.path().join("bnf");
    let svg = dir.path().join("svg");
    let names: Vec<String> = (0..12).map(|i| format!("stmt_{i:02}")).collect();
    let items: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), "x ::= X\n")).collect();
    fragments(&bnf, &items);
    let json = format!(
        "[{}]",
        names
            .iter()
            .map(|n| format!(r#"{{"name": "{n}"}}"#))
            .collect::<Vec<_>>()
            .join(",")
    );
    let specs = specs(&json);

    for max_workers in [1, 3] {
        let renderer = FakeRenderer::slow(Duration::from_millis(10));
        let mut config = RenderConfig::new(&bnf, &svg);
        config.max_workers = max_workers;

        let report = render_all(&config, &specs, &renderer).unwrap();

        assert_eq!(report.written.len(), 12);
        assert!(report.peak_in_flight <= max_workers);
        assert!(renderer.max_running.load(Ordering::SeqCst) <= max_workers);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 12);
    }
}

#[test]
fn gate_bounds_jobs_when_pool_is_wider() {
    let dir = tempfile::tempdir().unwrap();
    let bnf = dir.path().join("bnf");
    let svg = dir.path().join("svg");
    let names: Vec<String> = (0..16).map(|i| format!("stmt_{i:02}")).collect();
    let items: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), "x ::= X\n")).collect();
    fragments(&bnf, &items);
    let json = format!(
        "[{}]",
        names
            .iter()
            .map(|n| format!(r#"{{"name": "{n}"}}"#))
            .collect::<Vec<_>>()
            .join(",")
    );
    let renderer = FakeRenderer::slow(Duration::from_millis(20));
    let mut config = RenderConfig::new(&bnf, &svg);
    config.max_workers = 2;
    config.pool_threads = Some(8);

    let report = render_all(&config, &specs(&json), &renderer).unwrap();

    assert_eq!(report.written.len(), 16);
    assert!(report.peak_in_flight <= 2);
    assert!(report.peak_in_flight >= 1);
    assert!(renderer.max_running.load(Ordering::SeqCst) <= 2);
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 16);
}

#[test]
fn failures_are_collected_after_all_jobs_finish() {
    let dir = tempfile::tempdir().unwrap();
    let bnf = dir.path().join("bnf");
    let svg = dir.path().join("svg");
    fragments(
        &bnf,
        &[("a", "a ::= A\n"), ("b", "b ::= FAIL\n"), ("c", "c ::= FAIL\n"), ("d", "d ::= D\n")],
    );
    let specs = specs(r#"[{"name": "a"}, {"name": "b"}, {"name": "c"}, {"name": "d"}]"#);
    let mut config = RenderConfig::new(&bnf, &svg);
    config.max_workers = 2;

    let err = render_all(&config, &specs, &FakeRenderer::default()).unwrap_err();

    let DiagramError::Failed(errors) = err else {
        panic!("expected aggregate failure, got {err}");
    };
    let failed: Vec<&str> = errors.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(failed, vec!["b", "c"]);
    assert!(svg.join("a.html").exists());
    assert!(svg.join("d.html").exists());
}

#[test]
fn fail_fast_skips_jobs_not_yet_started() {
    let dir = tempfile::tempdir().unwrap();
    let bnf = dir.path().join("bnf");
    let svg = dir.path().join("svg");
    fragments(&bnf, &[("a", "a ::= A\n"), ("b", "b ::= FAIL\n"), ("c", "c ::= C\n")]);
    let specs = specs(r#"[{"name": "a"}, {"name": "b"}, {"name": "c"}]"#);
    let mut config = RenderConfig::new(&bnf, &svg);
    config.fail_fast = true;
    let renderer = FakeRenderer::default();

    let err = render_all(&config, &specs, &renderer).unwrap_err();

    assert_eq!(err.to_string(), "b: HTTP error: HTTP 500: generator down");
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 2);
    assert!(svg.join("a.html").exists());
    assert!(!svg.join("c.html").exists());
}

#[test]
fn empty_directory_renders_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let bnf = dir.path().join("bnf");
    fs::create_dir_all(&bnf).unwrap();

    let report = render_all(
        &RenderConfig::new(&bnf, dir.path().join("svg")),
        &SpecSet::default(),
        &FakeRenderer::default(),
    )
    .unwrap();

    assert!(report.written.is_empty());
}
