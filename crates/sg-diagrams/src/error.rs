//! Diagram rendering error types.

use std::path::PathBuf;

/// Single diagram rendering error.
#[derive(Debug, thiserror::Error)]
#[error("{name}: {kind}")]
pub struct RenderError {
    /// Fragment name.
    pub name: String,
    pub kind: RenderErrorKind,
}

/// Kind of diagram rendering error.
#[derive(Debug, thiserror::Error)]
pub enum RenderErrorKind {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("invalid XHTML: {0}")]
    Normalize(String),
    #[error("no <{0}> element in rendered diagram")]
    MissingTag(String),
    #[error("cannot build unlink pattern for {name}: {message}")]
    LinkPattern { name: String, message: String },
}

/// Error from a diagram rendering run.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    /// Fragment directory could not be listed.
    #[error("failed to list fragments in {}: {source}", path.display())]
    Discover {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output directory could not be created.
    #[error("failed to create {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A fragment has no specification entry.
    #[error("unfound spec: {0}")]
    UnmatchedSpec(String),

    /// Worker pool could not be created.
    #[error("failed to create worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    /// One or more render jobs failed.
    #[error("{}", summarize(.0))]
    Failed(Vec<RenderError>),
}

fn summarize(errors: &[RenderError]) -> String {
    match errors {
        [single] => single.to_string(),
        _ => {
            let lines: Vec<String> = errors.iter().map(|e| format!("  {e}")).collect();
            format!("{} diagrams failed:\n{}", errors.len(), lines.join("\n"))
        }
    }
}
