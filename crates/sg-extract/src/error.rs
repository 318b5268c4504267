//! Extraction error types.

use std::path::PathBuf;

use sg_grammar::GrammarError;
use sg_spec::ResourceError;

use crate::preprocess::START_MARKER;

/// Error from preprocessing or extraction. Every variant aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Grammar source could not be fetched.
    #[error("{0}")]
    Load(#[from] ResourceError),

    /// Grammar source lacks the start marker.
    #[error("grammar source has no {marker:?} marker", marker = START_MARKER)]
    MissingStartMarker,

    /// Grammar source is not valid UTF-8.
    #[error("grammar source is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// Preprocessed grammar could not be written to its scratch file.
    #[error("failed to write scratch grammar: {0}")]
    Scratch(#[source] std::io::Error),

    /// Preprocessed grammar could not be read or parsed.
    #[error("{0}")]
    Grammar(#[from] GrammarError),

    /// Extraction of one named target failed.
    #[error("{name}: {source}")]
    Extraction {
        /// Output name being extracted.
        name: String,
        /// Underlying grammar error.
        #[source]
        source: GrammarError,
    },

    /// Output file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
