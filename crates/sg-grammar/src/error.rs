//! Grammar error types.

use std::path::PathBuf;

/// Error reading, transforming or extracting from a grammar.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    /// Grammar file could not be read.
    #[error("failed to read grammar {}: {source}", path.display())]
    Io {
        /// Grammar path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Grammar text is malformed.
    #[error("syntax error on line {line}: {message}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// A referenced production does not exist.
    #[error("couldn't find production {0}")]
    UnknownProduction(String),
}

impl GrammarError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}
