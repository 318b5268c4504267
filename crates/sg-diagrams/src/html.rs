//! XHTML normalization and element extraction.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::RenderErrorKind;

/// Convert namespaced XHTML into plain HTML markup.
///
/// Element names lose their namespace prefix (`svg:rect` becomes `rect`) and
/// `xmlns` declarations are dropped. Attribute names keep their prefixes, so
/// `xlink:href` survives. Everything else passes through unchanged.
pub fn xhtml_to_html(xhtml: &str) -> Result<String, RenderErrorKind> {
    let mut reader = Reader::from_str(xhtml);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::new());

    loop {
        let event = match reader.read_event().map_err(normalize_err)? {
            Event::Eof => break,
            Event::Start(e) => Event::Start(strip_namespaces(&e)?),
            Event::Empty(e) => Event::Empty(strip_namespaces(&e)?),
            Event::End(e) => {
                let local = e.local_name();
                let name = std::str::from_utf8(local.as_ref()).map_err(normalize_err)?;
                Event::End(BytesEnd::new(name.to_owned()))
            }
            other => other,
        };
        writer.write_event(event).map_err(normalize_err)?;
    }

    String::from_utf8(writer.into_inner()).map_err(normalize_err)
}

fn strip_namespaces(element: &BytesStart<'_>) -> Result<BytesStart<'static>, RenderErrorKind> {
    let local = element.local_name();
    let name = std::str::from_utf8(local.as_ref()).map_err(normalize_err)?;
    let mut stripped = BytesStart::new(name.to_owned());

    for attr in element.attributes().with_checks(false) {
        let attr = attr.map_err(normalize_err)?;
        if attr.key.as_ref().starts_with(b"xmlns") {
            continue;
        }
        stripped.push_attribute(attr);
    }

    Ok(stripped.into_owned())
}

fn normalize_err(err: impl std::fmt::Display) -> RenderErrorKind {
    RenderErrorKind::Normalize(err.to_string())
}

/// Return the first `<tag>` element of `doc`, including its own tags.
pub fn extract_tag<'a>(doc: &'a str, tag: &str) -> Result<&'a str, RenderErrorKind> {
    let (start, _, _, end) = locate(doc, tag)?;
    Ok(&doc[start..end])
}

/// Return the content of the first `<tag>` element of `doc`.
pub fn extract_inner_tag<'a>(doc: &'a str, tag: &str) -> Result<&'a str, RenderErrorKind> {
    let (_, inner, close, _) = locate(doc, tag)?;
    Ok(&doc[inner..close])
}

/// Find the first `tag` element.
///
/// Returns the offsets of the opening `<`, the first byte after the opening
/// tag, the closing tag's `<`, and the first byte after the closing tag.
/// Nested elements with the same name are balanced.
fn locate(doc: &str, tag: &str) -> Result<(usize, usize, usize, usize), RenderErrorKind> {
    let missing = || RenderErrorKind::MissingTag(tag.to_owned());
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let start = find_open(doc, &open, 0).ok_or_else(missing)?;
    let head_end = start + doc[start..].find('>').ok_or_else(missing)? + 1;
    if doc[..head_end].ends_with("/>") {
        return Ok((start, head_end, head_end, head_end));
    }

    let mut depth = 1usize;
    let mut pos = head_end;
    loop {
        let next_close = doc[pos..].find(&close).map(|i| pos + i).ok_or_else(missing)?;
        match find_open(doc, &open, pos) {
            Some(nested) if nested < next_close => {
                depth += 1;
                pos = nested + open.len();
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Ok((start, head_end, next_close, next_close + close.len()));
                }
                pos = next_close + close.len();
            }
        }
    }
}

/// Find `<tag` at or after `from`, followed by whitespace, `>` or `/`.
fn find_open(doc: &str, open: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while let Some(i) = doc[pos..].find(open) {
        let at = pos + i;
        let after = doc[at + open.len()..].chars().next();
        if after.is_some_and(|c| c.is_whitespace() || c == '>' || c == '/') {
            return Some(at);
        }
        pos = at + open.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strips_element_prefixes_and_xmlns() {
        let xhtml = r##"<html xmlns="http://www.w3.org/1999/xhtml"><body><svg:svg xmlns:svg="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="10"><svg:a xlink:href="#x" xlink:title="x"><svg:rect x="1"/></svg:a></svg:svg></body></html>"##;
        assert_eq!(
            xhtml_to_html(xhtml).unwrap(),
            r##"<html><body><svg width="10"><a xlink:href="#x" xlink:title="x"><rect x="1"/></a></svg></body></html>"##
        );
    }

    #[test]
    fn test_text_and_entities_pass_through() {
        let xhtml = "<p>a &amp; b<br/>\n  c &lt; d</p>";
        assert_eq!(xhtml_to_html(xhtml).unwrap(), xhtml);
    }

    #[test]
    fn test_malformed_xhtml() {
        let err = xhtml_to_html("<a><b></a>").unwrap_err();
        assert!(matches!(err, RenderErrorKind::Normalize(_)));
    }

    #[test]
    fn test_extract_tag() {
        let doc = r#"<html><body><svg width="1"><rect/></svg><svg>second</svg></body></html>"#;
        assert_eq!(extract_tag(doc, "svg").unwrap(), r#"<svg width="1"><rect/></svg>"#);
    }

    #[test]
    fn test_extract_inner_tag() {
        let doc = "<html><body>\n<p>diagram</p><hr/><p>footer</p>\n</body></html>";
        assert_eq!(
            extract_inner_tag(doc, "body").unwrap(),
            "\n<p>diagram</p><hr/><p>footer</p>\n"
        );
    }

    #[test]
    fn test_prefix_names_are_not_confused() {
        let doc = "<bodyish>x</bodyish><body>y</body>";
        assert_eq!(extract_inner_tag(doc, "body").unwrap(), "y");
    }

    #[test]
    fn test_nested_elements_balance() {
        let doc = "<div><div>inner</div>tail</div>after";
        assert_eq!(extract_tag(doc, "div").unwrap(), "<div><div>inner</div>tail</div>");
    }

    #[test]
    fn test_self_closing_element() {
        let doc = r#"<p><svg width="1"/></p>"#;
        assert_eq!(extract_tag(doc, "svg").unwrap(), r#"<svg width="1"/>"#);
        assert_eq!(extract_inner_tag(doc, "svg").unwrap(), "");
    }

    #[test]
    fn test_missing_tag() {
        let err = extract_tag("<p>no diagram</p>", "svg").unwrap_err();
        assert_eq!(err.to_string(), "no <svg> element in rendered diagram");
    }
}
