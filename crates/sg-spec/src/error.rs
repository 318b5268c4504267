//! Error types for specification loading.

use std::path::PathBuf;

/// Failure to fetch raw bytes from a local path or remote address.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// Local file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// HTTP request failed (network error, timeout, etc).
    #[error("failed to fetch {url}: {source}")]
    Http {
        /// Requested address.
        url: String,
        /// Underlying transport error.
        #[source]
        source: ureq::Error,
    },

    /// Server answered with an error status.
    #[error("failed to fetch {url}: HTTP {status}: {body}")]
    HttpStatus {
        /// Requested address.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },
}

/// Error while loading or validating a specification set.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// The specification document could not be fetched.
    #[error("{0}")]
    Load(#[from] ResourceError),

    /// The specification document is malformed.
    #[error("malformed specification {location}: {message}")]
    Parse {
        /// Where the document came from.
        location: String,
        /// Parser error message.
        message: String,
    },

    /// Two entries share the same name.
    #[error("duplicate specification name: {0}")]
    DuplicateName(String),

    /// An entry has an empty name.
    #[error("specification entry #{0} has an empty name")]
    EmptyName(usize),

    /// A `match`, `exclude` or `regreplace` pattern does not compile.
    #[error("invalid {field} pattern {pattern:?} in specification {name}: {source}")]
    InvalidPattern {
        /// Entry name.
        name: String,
        /// Field holding the pattern.
        field: &'static str,
        /// Offending pattern.
        pattern: String,
        /// Compilation error.
        #[source]
        source: regex::Error,
    },
}
