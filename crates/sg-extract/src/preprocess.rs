//! Grammar source normalization.
//!
//! The grammar source carries dialect quirks the grammar reader cannot digest:
//! quoted operator tokens, double-quoted token aliases and a few workaround
//! fragments. [`Preprocessor`] cuts the source down to the rule section and
//! rewrites those quirks through two substitution tables.

use std::io::Write;

use regex::Regex;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ExtractError;

/// Text that starts the rule section; everything before it is discarded.
pub const START_MARKER: &str = "Start:";

/// Literal text substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub from: String,
    pub to: String,
}

impl Substitution {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Quoted operators become single-quoted literals.
const OPERATORS: &[(&str, &str)] = &[
    (r#""=""#, "'='"),
    (r#"">=""#, "'>='"),
    (r#""<=""#, "'<='"),
    (r#""<>""#, "'<>'"),
    (r#""<=>""#, "'<=>'"),
    (r#""<<""#, "'<<'"),
    (r#"">>""#, "'>>'"),
    (r#""!=""#, "'!='"),
    ("&&", "'&&'"),
];

/// Remaining double quotes and fragments that only exist as parser workarounds.
const FIXUPS: &[(&str, &str)] = &[
    ("\"", ""),
    ("GeneratedAlways:\n\n|", "GeneratedAlways: "),
    (
        "EnforcedOrNotOrNotNullOpt:\n\t//\t This branch is needed to workaround the need of a lookahead of 2 for the grammar:\n\t//\n\t//\t  { [NOT] NULL | CHECK(...) [NOT] ENFORCED } ...",
        "EnforcedOrNotOrNotNullOpt:",
    ),
    ("| CHECK", "CHECK"),
];

fn table(entries: &[(&str, &str)]) -> Vec<Substitution> {
    entries
        .iter()
        .map(|(from, to)| Substitution::new(*from, *to))
        .collect()
}

/// Built-in operator table.
#[must_use]
pub fn default_operators() -> Vec<Substitution> {
    table(OPERATORS)
}

/// Built-in fixup table.
#[must_use]
pub fn default_fixups() -> Vec<Substitution> {
    table(FIXUPS)
}

/// Two-pass grammar source normalizer.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    operators: Vec<Substitution>,
    fixups: Vec<Substitution>,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(default_operators(), default_fixups())
    }
}

impl Preprocessor {
    /// Create a preprocessor with explicit tables.
    #[must_use]
    pub fn new(operators: Vec<Substitution>, fixups: Vec<Substitution>) -> Self {
        Self { operators, fixups }
    }

    /// Normalize raw grammar source.
    ///
    /// Truncates everything before [`START_MARKER`], then applies the operator
    /// table followed by the fixup table.
    pub fn preprocess(&self, raw: &str) -> Result<String, ExtractError> {
        let start = raw.find(START_MARKER).ok_or(ExtractError::MissingStartMarker)?;
        let text = &raw[start..];
        debug!("Dropped {start} bytes before {START_MARKER}");

        let text = replace_table(text, &self.operators);
        Ok(replace_table(&text, &self.fixups))
    }

    /// Normalize raw grammar source into a scratch file.
    ///
    /// The file is deleted when the returned handle is dropped.
    pub fn write_scratch(&self, raw: &str) -> Result<NamedTempFile, ExtractError> {
        let text = self.preprocess(raw)?;
        let mut file = tempfile::Builder::new()
            .prefix("sqlgram.")
            .suffix(".y")
            .tempfile()
            .map_err(ExtractError::Scratch)?;
        file.write_all(text.as_bytes())
            .and_then(|()| file.flush())
            .map_err(ExtractError::Scratch)?;
        debug!("Wrote preprocessed grammar to {}", file.path().display());
        Ok(file)
    }
}

/// Apply a substitution table in a single left-to-right scan.
///
/// At each position the first entry (in table order) whose `from` matches
/// wins, and replaced text is never rescanned.
pub fn replace_table(text: &str, table: &[Substitution]) -> String {
    let entries: Vec<&Substitution> = table.iter().filter(|s| !s.from.is_empty()).collect();
    if entries.is_empty() {
        return text.to_owned();
    }

    let alternation = entries
        .iter()
        .map(|s| regex::escape(&s.from))
        .collect::<Vec<_>>()
        .join("|");
    // Escaped literals always form a valid pattern
    let Ok(re) = Regex::new(&alternation) else {
        return text.to_owned();
    };

    re.replace_all(text, |caps: &regex::Captures<'_>| {
        let matched = &caps[0];
        entries
            .iter()
            .find(|s| s.from == matched)
            .map_or_else(|| matched.to_owned(), |s| s.to.clone())
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_truncates_before_start_marker() {
        let out = Preprocessor::default()
            .preprocess("%token SELECT\n%%\nStart:\n\tstmt\n")
            .unwrap();
        assert_eq!(out, "Start:\n\tstmt\n");
    }

    #[test]
    fn test_missing_marker() {
        let err = Preprocessor::default().preprocess("stmt: SELECT ;").unwrap_err();
        assert!(matches!(err, ExtractError::MissingStartMarker));
        assert_eq!(err.to_string(), r#"grammar source has no "Start:" marker"#);
    }

    #[test]
    fn test_quoted_operators_become_literals() {
        let out = Preprocessor::default()
            .preprocess(r#"Start: a "<=>" b | a "<=" b | a ">=" b | a && b | a "=" b"#)
            .unwrap();
        assert_eq!(out, "Start: a '<=>' b | a '<=' b | a '>=' b | a '&&' b | a '=' b");
    }

    #[test]
    fn test_double_quotes_stripped() {
        let out = Preprocessor::default()
            .preprocess(r#"Start: "SELECT" Field ;"#)
            .unwrap();
        assert_eq!(out, "Start: SELECT Field ;");
    }

    #[test]
    fn test_workaround_fragments_removed() {
        let raw = "Start: x\nGeneratedAlways:\n\n|\tGENERATED ALWAYS\nEnforcedOrNotOrNotNullOpt:\n\t//\t This branch is needed to workaround the need of a lookahead of 2 for the grammar:\n\t//\n\t//\t  { [NOT] NULL | CHECK(...) [NOT] ENFORCED } ...\n| CHECK x\n";
        let out = Preprocessor::default().preprocess(raw).unwrap();
        assert_eq!(
            out,
            "Start: x\nGeneratedAlways: \tGENERATED ALWAYS\nEnforcedOrNotOrNotNullOpt:\nCHECK x\n"
        );
    }

    #[test]
    fn test_first_entry_wins_and_no_rescan() {
        let table = vec![
            Substitution::new("ab", "X"),
            Substitution::new("abc", "Y"),
            Substitution::new("X", "Z"),
        ];
        assert_eq!(replace_table("abcab", &table), "XcX");
    }

    #[test]
    fn test_empty_from_ignored() {
        let table = vec![Substitution::new("", "boom"), Substitution::new("a", "b")];
        assert_eq!(replace_table("aaa", &table), "bbb");
    }

    #[test]
    fn test_custom_tables() {
        let pre = Preprocessor::new(vec![Substitution::new("<-", "'<-'")], Vec::new());
        let out = pre.preprocess(r#"Start: a <- "b""#).unwrap();
        assert_eq!(out, r#"Start: a '<-' "b""#);
    }

    #[test]
    fn test_scratch_file_removed_on_drop() {
        let scratch = Preprocessor::default().write_scratch("Start: x ;").unwrap();
        let path = scratch.path().to_path_buf();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Start: x ;");

        drop(scratch);
        assert!(!path.exists());
    }
}
