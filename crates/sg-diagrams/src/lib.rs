//! Railroad diagram rendering for extracted grammar fragments.
//!
//! - [`render_all`] discovers `*.bnf` fragments and renders them on a bounded
//!   worker pool, writing one `<name>.html` per fragment
//! - [`RailroadClient`] talks to a Railroad Diagram Generator over HTTP; any
//!   [`DiagramRenderer`] can stand in for it
//! - [`xhtml_to_html`], [`extract_tag`] and [`extract_inner_tag`] turn the
//!   generator's XHTML into embeddable markup
//! - [`links`] rewrites diagram hyperlinks per specification entry

mod error;
mod gate;
mod html;
pub mod links;
mod orchestrator;
mod railroad;

pub use error::{DiagramError, RenderError, RenderErrorKind};
pub use gate::{AdmissionGate, Permit};
pub use html::{extract_inner_tag, extract_tag, xhtml_to_html};
pub use links::DEFAULT_REFERENCE_DOC;
pub use orchestrator::{HTML_EXTENSION, RenderConfig, RenderReport, discover, render_all};
pub use railroad::{DEFAULT_RENDERER_URL, DiagramRenderer, RailroadClient};
