//! Text rewriting applied to extracted productions.

use sg_spec::StmtSpec;
use tracing::debug;

/// Identifier placeholder token and its readable replacement.
const IDENT_PLACEHOLDER: (&str, &str) = ("IDENT", "identifier");

/// Suffix marking lookahead tokens in the grammar source.
const LOOKAHEAD_SUFFIX: &str = "_LA";

/// Unconditional cosmetic cleanup of extractor output.
pub fn apply_cosmetics(text: &str) -> String {
    text.replace(IDENT_PLACEHOLDER.0, IDENT_PLACEHOLDER.1)
        .replace(LOOKAHEAD_SUFFIX, "")
}

/// Apply a specification's literal then regex replacements.
///
/// Both passes run in lexicographic key order, so the result only depends on
/// the input text and the specification contents.
pub fn apply_replacements(text: String, spec: &StmtSpec) -> String {
    let mut text = text;

    for (from, to) in &spec.replace {
        debug!("{}: replacing {from:?} -> {to:?}", spec.name);
        text = text.replace(from.as_str(), to);
    }

    for rule in &spec.regreplace {
        debug!(
            "{}: replacing re {:?} -> {:?}",
            spec.name,
            rule.pattern.as_str(),
            rule.replacement
        );
        text = rule
            .pattern
            .replace_all(&text, rule.replacement.as_str())
            .into_owned();
    }

    text
}
