//! BNF extraction for sqlgram.
//!
//! Turns one grammar source into per-statement BNF fragments:
//! - [`Preprocessor`]: trims the source to its rule section and rewrites
//!   dialect quirks through substitution tables
//! - [`ExtractPipeline`]: extracts the top-level production and each
//!   specification entry, rewrites the text and writes `<name>.bnf`
//!
//! Extraction is sequential and fail-fast: the first error ends the run.

mod error;
mod pipeline;
mod preprocess;
mod rewrite;

pub use error::ExtractError;
pub use pipeline::{BNF_EXTENSION, ExtractConfig, ExtractPipeline, ExtractReport};
pub use preprocess::{
    Preprocessor, START_MARKER, Substitution, default_fixups, default_operators, replace_table,
};
pub use rewrite::{apply_cosmetics, apply_replacements};
