//! Statement specifications for sqlgram.
//!
//! A specification document is an ordered list of entries, each governing one
//! named extraction target: which production to extract, which productions to
//! inline first, how to rewrite the extracted text and how to rewrite links in
//! the rendered diagram.
//!
//! Documents are JSON by default; locations ending in `.yaml` or `.yml` are
//! parsed as YAML. Loading validates eagerly: every pattern is compiled and
//! duplicate names are rejected, so a [`SpecSet`] is always usable as-is.
//!
//! ```
//! use sg_spec::{SpecFormat, SpecSet};
//!
//! let json = br#"[{"name": "select", "stmt": "select_stmt"}]"#;
//! let specs = SpecSet::parse(json, SpecFormat::Json, "inline").unwrap();
//! assert_eq!(specs.get("select").unwrap().stmt, "select_stmt");
//! ```

mod error;
mod filter;
mod resource;

use std::collections::{BTreeMap, HashMap};

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

pub use error::{ResourceError, SpecError};
pub use filter::Filter;
pub use resource::load_resource;

/// Reserved name of the grammar's entry point production.
///
/// It is always extracted first, independently of any specification, and its
/// diagram gets the full-page treatment instead of link rewriting.
pub const TOP_LEVEL: &str = "Start";

/// Regex replacement rule, applied after literal replacements.
#[derive(Debug, Clone)]
pub struct RegexReplacement {
    /// Compiled pattern.
    pub pattern: Regex,
    /// Replacement template (`$1`, `${name}` expand capture groups).
    pub replacement: String,
}

/// One validated specification entry.
#[derive(Debug, Clone)]
pub struct StmtSpec {
    /// Unique name, used as the output file stem.
    pub name: String,
    /// Production to extract (defaults to `name`).
    pub stmt: String,
    /// Productions to inline before extraction, in order.
    pub inline: Vec<String>,
    /// Literal replacements, iterated in key order.
    pub replace: BTreeMap<String, String>,
    /// Regex replacements, sorted by pattern source.
    pub regreplace: Vec<RegexReplacement>,
    /// Alternatives must match one of these (when non-empty).
    pub matches: Vec<Regex>,
    /// Alternatives matching any of these are dropped.
    pub exclude: Vec<Regex>,
    /// Keep the extracted body on a single line.
    pub nosplit: bool,
    /// Cross-references whose link markup is stripped from the diagram.
    pub unlink: Vec<String>,
    /// Cross-reference retargeting, iterated in key order.
    pub relink: BTreeMap<String, String>,
}

/// Entry as written in the document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StmtSpecRaw {
    name: String,
    #[serde(default)]
    stmt: Option<String>,
    #[serde(default)]
    inline: Option<Vec<String>>,
    #[serde(default)]
    replace: Option<BTreeMap<String, String>>,
    #[serde(default)]
    regreplace: Option<BTreeMap<String, String>>,
    #[serde(default, rename = "match")]
    matches: Option<Vec<String>>,
    #[serde(default)]
    exclude: Option<Vec<String>>,
    #[serde(default)]
    unlink: Option<Vec<String>>,
    #[serde(default)]
    relink: Option<BTreeMap<String, String>>,
    #[serde(default)]
    nosplit: bool,
}

impl StmtSpecRaw {
    /// Compile patterns and resolve defaults.
    fn resolve(self, position: usize) -> Result<StmtSpec, SpecError> {
        if self.name.is_empty() {
            return Err(SpecError::EmptyName(position));
        }

        let compile = |field: &'static str, pattern: &str| {
            Regex::new(pattern).map_err(|source| SpecError::InvalidPattern {
                name: self.name.clone(),
                field,
                pattern: pattern.to_owned(),
                source,
            })
        };

        let matches = self
            .matches
            .iter()
            .flatten()
            .map(|p| compile("match", p))
            .collect::<Result<Vec<_>, _>>()?;
        let exclude = self
            .exclude
            .iter()
            .flatten()
            .map(|p| compile("exclude", p))
            .collect::<Result<Vec<_>, _>>()?;
        // BTreeMap iteration gives lexicographic pattern order
        let regreplace = self
            .regreplace
            .iter()
            .flatten()
            .map(|(pattern, replacement)| {
                Ok(RegexReplacement {
                    pattern: compile("regreplace", pattern)?,
                    replacement: replacement.clone(),
                })
            })
            .collect::<Result<Vec<_>, SpecError>>()?;

        let stmt = match self.stmt {
            Some(stmt) if !stmt.is_empty() => stmt,
            _ => self.name.clone(),
        };

        Ok(StmtSpec {
            name: self.name,
            stmt,
            inline: self.inline.unwrap_or_default(),
            replace: self.replace.unwrap_or_default(),
            regreplace,
            matches,
            exclude,
            nosplit: self.nosplit,
            unlink: self.unlink.unwrap_or_default(),
            relink: self.relink.unwrap_or_default(),
        })
    }
}

/// Serialization format of a specification document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Json,
    Yaml,
}

impl SpecFormat {
    /// Guess the format from a location's extension.
    #[must_use]
    pub fn from_location(location: &str) -> Self {
        let path = location.split(['?', '#']).next().unwrap_or(location);
        if path.ends_with(".yaml") || path.ends_with(".yml") {
            Self::Yaml
        } else {
            Self::Json
        }
    }
}

/// Ordered, validated set of specification entries.
///
/// Preserves document order and guarantees unique names.
#[derive(Debug, Clone, Default)]
pub struct SpecSet {
    specs: Vec<StmtSpec>,
    index: HashMap<String, usize>,
}

impl SpecSet {
    /// Build a set from entries, rejecting duplicate names.
    pub fn new(specs: Vec<StmtSpec>) -> Result<Self, SpecError> {
        let mut index = HashMap::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            if index.insert(spec.name.clone(), i).is_some() {
                return Err(SpecError::DuplicateName(spec.name.clone()));
            }
        }
        Ok(Self { specs, index })
    }

    /// Load a specification document from a path or URL.
    ///
    /// An empty location yields an empty set.
    pub fn load(location: &str) -> Result<Self, SpecError> {
        if location.is_empty() {
            return Ok(Self::default());
        }
        let bytes = load_resource(location)?;
        Self::parse(&bytes, SpecFormat::from_location(location), location)
    }

    /// Parse a specification document.
    ///
    /// `location` is only used in error messages.
    pub fn parse(bytes: &[u8], format: SpecFormat, location: &str) -> Result<Self, SpecError> {
        let parse_err = |message: String| SpecError::Parse {
            location: location.to_owned(),
            message,
        };

        let raw: Vec<StmtSpecRaw> = match format {
            SpecFormat::Json => {
                serde_json::from_slice(bytes).map_err(|e| parse_err(e.to_string()))?
            }
            SpecFormat::Yaml => {
                serde_yaml::from_slice(bytes).map_err(|e| parse_err(e.to_string()))?
            }
        };

        let specs = raw
            .into_iter()
            .enumerate()
            .map(|(i, r)| r.resolve(i))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Loaded {} specifications from {location}", specs.len());
        Self::new(specs)
    }

    /// Look up an entry by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StmtSpec> {
        self.index.get(name).map(|&i| &self.specs[i])
    }

    /// Iterate entries in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, StmtSpec> {
        self.specs.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl<'a> IntoIterator for &'a SpecSet {
    type Item = &'a StmtSpec;
    type IntoIter = std::slice::Iter<'a, StmtSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
