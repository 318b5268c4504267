//! Railroad Diagram Generator client.

use std::time::Duration;

use tracing::debug;
use ureq::Agent;

use crate::error::RenderErrorKind;

/// Public Railroad Diagram Generator endpoint.
pub const DEFAULT_RENDERER_URL: &str = "https://www.bottlecaps.de/rr/ui";

/// Diagram width requested from the generator, in pixels.
const DIAGRAM_WIDTH: &str = "760";

/// Converts an EBNF fragment into a native XHTML diagram document.
///
/// Implementations are shared across render workers.
pub trait DiagramRenderer: Send + Sync {
    /// Render `ebnf` and return the generator's XHTML document.
    fn render(&self, ebnf: &str) -> Result<String, RenderErrorKind>;
}

/// HTTP client for a Railroad Diagram Generator instance.
#[derive(Debug, Clone)]
pub struct RailroadClient {
    agent: Agent,
    url: String,
}

impl RailroadClient {
    /// Create a client for the generator at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            url: url.into(),
        }
    }

    /// Generator URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl DiagramRenderer for RailroadClient {
    fn render(&self, ebnf: &str) -> Result<String, RenderErrorKind> {
        debug!("POST {} ({} bytes of EBNF)", self.url, ebnf.len());
        let response = self
            .agent
            .post(&self.url)
            .send_form(form_fields(ebnf))
            .map_err(|e| RenderErrorKind::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(RenderErrorKind::Http(format!("HTTP {status}: {error_body}")));
        }

        body.read_to_string()
            .map_err(|e| RenderErrorKind::Io(e.to_string()))
    }
}

/// Form fields for one generator request.
fn form_fields(ebnf: &str) -> [(&'static str, &str); 7] {
    [
        ("color", "#ffffff"),
        ("frame", "diagram"),
        ("text", ebnf),
        ("width", DIAGRAM_WIDTH),
        ("options", "eliminaterecursion"),
        ("options", "factoring"),
        ("options", "inline"),
    ]
}
