//! Post-processing of rendered diagram markup.

use std::sync::LazyLock;

use regex::Regex;
use sg_spec::StmtSpec;

use crate::error::RenderErrorKind;
use crate::html::{extract_inner_tag, extract_tag};

/// Reference document that diagram links point at.
pub const DEFAULT_REFERENCE_DOC: &str = "sql-grammar.html";

/// Marker separating the overview diagram from the generator's own footer.
const RULE_MARKER: &str = "<hr/>";

/// Attribution appended to the overview diagram.
const ATTRIBUTION: &str = r#"<p>generated by <a href="http://www.bottlecaps.de/rr/ui" data-proofer-ignore>Railroad Diagram Generator</a></p>"#;

/// Runs of blank lines or indentation following a newline.
static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n(\n| )+").unwrap());

/// Build the overview page body from a normalized generator document.
pub fn top_level_body(html: &str) -> Result<String, RenderErrorKind> {
    let body = extract_inner_tag(html, "body")?;
    let diagram = body.split_once(RULE_MARKER).map_or(body, |(head, _)| head);
    Ok(format!("<div>{diagram}{ATTRIBUTION}</div>"))
}

/// Build a statement diagram from a normalized generator document.
///
/// Takes the `<svg>` element, points self-references at `reference_doc`,
/// applies the entry's unlink and relink rules, and collapses blank runs.
pub fn statement_body(
    html: &str,
    spec: &StmtSpec,
    reference_doc: &str,
) -> Result<String, RenderErrorKind> {
    let svg = extract_tag(html, "svg")?;
    let mut body = retarget(svg, reference_doc);
    for name in &spec.unlink {
        body = unlink(&body, reference_doc, name)?;
    }
    for (from, to) in &spec.relink {
        body = relink(&body, reference_doc, from, to);
    }
    let body = format!("<div>{body}</div>");
    Ok(format!("{}\n", BLANK_RUNS.replace_all(&body, "\n")))
}

/// Point in-document `#name` links at `reference_doc`.
pub fn retarget(svg: &str, reference_doc: &str) -> String {
    svg.replace(
        r##"<a xlink:href="#"##,
        &format!(r##"<a xlink:href="{reference_doc}#"##),
    )
}

/// Replace links to `name` with their content.
pub fn unlink(svg: &str, reference_doc: &str, name: &str) -> Result<String, RenderErrorKind> {
    let pattern = format!(
        r#"(?s)<a xlink:href="{}" xlink:title="{}">(.*?)</a>"#,
        regex::escape(&format!("{reference_doc}#{name}")),
        regex::escape(name),
    );
    let re = Regex::new(&pattern).map_err(|e| RenderErrorKind::LinkPattern {
        name: name.to_owned(),
        message: e.to_string(),
    })?;
    Ok(re.replace_all(svg, "$1").into_owned())
}

/// Point links to `from` at `to` instead.
pub fn relink(svg: &str, reference_doc: &str, from: &str, to: &str) -> String {
    svg.replace(&anchor(reference_doc, from), &anchor(reference_doc, to))
}

fn anchor(reference_doc: &str, name: &str) -> String {
    format!(r#"<a xlink:href="{reference_doc}#{name}" xlink:title="{name}">"#)
}
