//! Configuration management for sqlgram.
//!
//! Parses `sg.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. Every section is
//! optional; a missing file yields the built-in defaults.
//!
//! CLI settings are applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `grammar.addr`
//! - `grammar.spec`
//! - `diagrams.renderer_url`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "sg.toml";

/// Grammar source used when nothing else is configured.
pub const DEFAULT_GRAMMAR_ADDR: &str = "./github.com/pingcap/parser/parser.y";

/// Filter pattern that keeps every name.
pub const DEFAULT_FILTER: &str = ".*";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override grammar source location.
    pub addr: Option<String>,
    /// Override specification location.
    pub spec: Option<String>,
    /// Override name filter pattern.
    pub filter: Option<String>,
    /// Override filter inversion.
    pub invert_match: Option<bool>,
    /// Override render worker count.
    pub max_workers: Option<usize>,
    /// Override fail-fast rendering.
    pub fail_fast: Option<bool>,
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub grammar: GrammarConfig,
    pub preprocess: PreprocessConfig,
    pub diagrams: DiagramsConfig,
    /// Name filter pattern.
    pub filter: String,
    /// Keep names the filter does not match instead.
    pub invert_match: bool,
    /// Path to the config file (set after loading).
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grammar: GrammarConfig::default(),
            preprocess: PreprocessConfig::default(),
            diagrams: DiagramsConfig::default(),
            filter: DEFAULT_FILTER.to_owned(),
            invert_match: false,
            config_path: None,
        }
    }
}

/// Grammar and specification sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarConfig {
    /// Grammar source: a path or an `http(s)://` address.
    pub addr: String,
    /// Specification document; empty means no specification.
    pub spec: String,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_GRAMMAR_ADDR.to_owned(),
            spec: String::new(),
        }
    }
}

/// One literal substitution from `[preprocess]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubstitutionEntry {
    pub from: String,
    pub to: String,
}

/// Preprocessor table overrides. `None` keeps the built-in table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreprocessConfig {
    pub operators: Option<Vec<SubstitutionEntry>>,
    pub fixups: Option<Vec<SubstitutionEntry>>,
}

/// Diagram rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramsConfig {
    /// Railroad Diagram Generator endpoint.
    pub renderer_url: String,
    /// Document that diagram links point at.
    pub reference_doc: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum number of concurrent render jobs.
    pub max_workers: usize,
    /// Skip jobs not yet started after the first failure.
    pub fail_fast: bool,
}

impl DiagramsConfig {
    /// Per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            renderer_url: "https://www.bottlecaps.de/rr/ui".to_owned(),
            reference_doc: "sql-grammar.html".to_owned(),
            timeout_secs: 30,
            max_workers: 1,
            fail_fast: false,
        }
    }
}

/// Configuration file as parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigRaw {
    grammar: GrammarConfigRaw,
    preprocess: PreprocessConfig,
    diagrams: DiagramsConfigRaw,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct GrammarConfigRaw {
    addr: Option<String>,
    spec: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DiagramsConfigRaw {
    renderer_url: Option<String>,
    reference_doc: Option<String>,
    timeout_secs: Option<u64>,
    max_workers: Option<usize>,
    fail_fast: Option<bool>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`grammar.addr`").
        field: String,
        /// Error message (e.g., "${`GRAMMAR_DIR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !is_http_url(url) {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

fn is_http_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Resolve a file location against `base`, leaving addresses and absolute paths alone.
fn resolve_location(location: String, base: &Path) -> String {
    if location.is_empty() || is_http_url(&location) || Path::new(&location).is_absolute() {
        return location;
    }
    base.join(&location).to_string_lossy().into_owned()
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `sg.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, so CLI arguments take
    /// precedence over config file values. The result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(addr) = &settings.addr {
            self.grammar.addr.clone_from(addr);
        }
        if let Some(spec) = &settings.spec {
            self.grammar.spec.clone_from(spec);
        }
        if let Some(filter) = &settings.filter {
            self.filter.clone_from(filter);
        }
        if let Some(invert_match) = settings.invert_match {
            self.invert_match = invert_match;
        }
        if let Some(max_workers) = settings.max_workers {
            self.diagrams.max_workers = max_workers;
        }
        if let Some(fail_fast) = settings.fail_fast {
            self.diagrams.fail_fast = fail_fast;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse TOML text; relative file locations resolve against `config_dir`.
    fn from_toml(content: &str, config_dir: &Path) -> Result<Self, ConfigError> {
        let raw: ConfigRaw = toml::from_str(content)?;
        let defaults = Self::default();

        let grammar = GrammarConfig {
            addr: match raw.grammar.addr {
                Some(addr) => resolve_location(expand::expand_env(&addr, "grammar.addr")?, config_dir),
                None => defaults.grammar.addr,
            },
            spec: match raw.grammar.spec {
                Some(spec) => resolve_location(expand::expand_env(&spec, "grammar.spec")?, config_dir),
                None => defaults.grammar.spec,
            },
        };

        let diagrams = DiagramsConfig {
            renderer_url: match raw.diagrams.renderer_url {
                Some(url) => expand::expand_env(&url, "diagrams.renderer_url")?,
                None => defaults.diagrams.renderer_url,
            },
            reference_doc: raw
                .diagrams
                .reference_doc
                .unwrap_or(defaults.diagrams.reference_doc),
            timeout_secs: raw
                .diagrams
                .timeout_secs
                .unwrap_or(defaults.diagrams.timeout_secs),
            max_workers: raw
                .diagrams
                .max_workers
                .unwrap_or(defaults.diagrams.max_workers),
            fail_fast: raw.diagrams.fail_fast.unwrap_or(defaults.diagrams.fail_fast),
        };

        Ok(Self {
            grammar,
            preprocess: raw.preprocess,
            diagrams,
            ..defaults
        })
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.grammar.addr, "grammar.addr")?;
        self.validate_diagrams()?;

        if let Err(e) = regex::Regex::new(&self.filter) {
            return Err(ConfigError::Validation(format!("invalid filter {:?}: {e}", self.filter)));
        }

        for (field, table) in [
            ("preprocess.operators", &self.preprocess.operators),
            ("preprocess.fixups", &self.preprocess.fixups),
        ] {
            if table.iter().flatten().any(|entry| entry.from.is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "{field} entries need a non-empty `from`"
                )));
            }
        }

        Ok(())
    }

    /// Validate diagrams configuration.
    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.diagrams.renderer_url, "diagrams.renderer_url")?;
        require_http_url(&self.diagrams.renderer_url, "diagrams.renderer_url")?;
        require_non_empty(&self.diagrams.reference_doc, "diagrams.reference_doc")?;

        if self.diagrams.max_workers == 0 {
            return Err(ConfigError::Validation(
                "diagrams.max_workers must be greater than 0".to_owned(),
            ));
        }
        if self.diagrams.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "diagrams.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }
}
