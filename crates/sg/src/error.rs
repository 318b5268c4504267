//! CLI error types.

use sg_config::ConfigError;
use sg_diagrams::DiagramError;
use sg_extract::ExtractError;
use sg_spec::SpecError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Spec(#[from] SpecError),

    #[error("{0}")]
    Extract(#[from] ExtractError),

    #[error("{0}")]
    Diagram(#[from] DiagramError),

    #[error("{0}")]
    Validation(String),
}
