//! Name filtering shared by extraction and diagram rendering.

use regex::Regex;

/// A regular expression plus an invert flag deciding which names to process.
///
/// In normal mode names matching the pattern are kept; in invert mode names
/// that do not match are kept. The default filter keeps every name.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pattern: Option<Regex>,
    invert: bool,
}

impl Filter {
    /// Compile a filter from a pattern.
    pub fn new(pattern: &str, invert: bool) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Some(Regex::new(pattern)?),
            invert,
        })
    }

    /// Whether `name` should be processed.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        let hit = self.pattern.as_ref().is_none_or(|re| re.is_match(name));
        hit != self.invert
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keeps_everything() {
        let filter = Filter::default();
        assert!(filter.matches("select_stmt"));
        assert!(filter.matches(""));
    }

    #[test]
    fn test_prefix_filter() {
        let filter = Filter::new("^select", false).unwrap();
        assert!(filter.matches("select_stmt"));
        assert!(!filter.matches("insert_stmt"));
    }

    #[test]
    fn test_inverted_prefix_filter() {
        let filter = Filter::new("^select", true).unwrap();
        assert!(!filter.matches("select_stmt"));
        assert!(filter.matches("insert_stmt"));
    }

    #[test]
    fn test_filter_is_unanchored() {
        let filter = Filter::new("table", false).unwrap();
        assert!(filter.matches("create_table"));
        assert!(filter.matches("alter_table_stmt"));
        assert!(!filter.matches("create_index"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(Filter::new("(", false).is_err());
    }
}
