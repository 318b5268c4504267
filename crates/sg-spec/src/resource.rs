//! Byte retrieval from local paths or HTTP addresses.
//!
//! Both the grammar source and the specification document may live on disk or
//! behind a URL; [`load_resource`] hides the difference.

use std::path::Path;
use std::time::Duration;

use tracing::debug;
use ureq::Agent;

use crate::error::ResourceError;

/// Default HTTP timeout for remote resources.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Whether a location names a remote resource.
fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Fetch the raw bytes behind `location`.
///
/// Locations starting with `http://` or `https://` are fetched with a GET
/// request; anything else is read from the filesystem.
pub fn load_resource(location: &str) -> Result<Vec<u8>, ResourceError> {
    if is_remote(location) {
        fetch(location)
    } else {
        let path = Path::new(location);
        debug!("Reading {}", path.display());
        std::fs::read(path).map_err(|source| ResourceError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn fetch(url: &str) -> Result<Vec<u8>, ResourceError> {
    debug!("Fetching {url}");

    let agent: Agent = Agent::config_builder()
        .timeout_global(Some(DEFAULT_TIMEOUT))
        .http_status_as_error(false)
        .build()
        .into();

    let http_err = |source| ResourceError::Http {
        url: url.to_owned(),
        source,
    };

    let response = agent.get(url).call().map_err(http_err)?;
    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ResourceError::HttpStatus {
            url: url.to_owned(),
            status,
            body: error_body,
        });
    }

    body.with_config()
        .limit(64 * 1024 * 1024)
        .read_to_vec()
        .map_err(http_err)
}
