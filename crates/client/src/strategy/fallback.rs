//! Synthetic responses for when neither network nor store can answer.

use appshell_core::{AppConfig, Drink, Error, Response, SearchResponse};
use bytes::Bytes;

/// Marker header on the synthetic search payload.
pub const OFFLINE_RESPONSE_HEADER: &str = "X-Offline-Response";

/// Marker header on the degraded stylesheet.
pub const OFFLINE_CSS_HEADER: &str = "X-Offline-CSS";

/// Id of the placeholder drink in the synthetic search payload.
pub const OFFLINE_DRINK_ID: &str = "offline-001";

/// Body of the 503 served for unreachable external resources.
pub const UNAVAILABLE_BODY: &str = "Resource not available offline";

const DEGRADED_STYLESHEET: &str = include_str!("../../assets/offline-fallback.css");

/// Prebuilt fallback bodies.
///
/// Everything that could fail is done at construction, so producing a
/// fallback during request handling cannot fail.
#[derive(Debug, Clone)]
pub struct Fallbacks {
    offline_search: Bytes,
}

impl Fallbacks {
    pub fn new(offline_label: &str, offline_thumb: &str) -> Result<Self, Error> {
        let payload = SearchResponse {
            drinks: Some(vec![Drink {
                id: OFFLINE_DRINK_ID.to_string(),
                name: offline_label.to_string(),
                thumbnail: Some(offline_thumb.to_string()),
            }]),
        };
        let body = serde_json::to_vec(&payload)
            .map_err(|e| Error::InvalidInput(format!("cannot encode offline payload: {e}")))?;
        Ok(Self { offline_search: Bytes::from(body) })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(&config.offline_label, &config.offline_thumb)
    }

    /// Minimal stylesheet standing in for the unreachable framework.
    pub fn degraded_stylesheet(&self) -> Response {
        Response::new(200)
            .with_header("Content-Type", "text/css")
            .with_header(OFFLINE_CSS_HEADER, "true")
            .with_body(DEGRADED_STYLESHEET)
    }

    /// Empty 200 so a missing non-critical shell asset never breaks the page.
    pub fn empty_shell(&self) -> Response {
        Response::empty_ok()
    }

    /// Single placeholder drink, flagged as synthetic.
    pub fn offline_search(&self) -> Response {
        Response::new(200)
            .with_header("Content-Type", "application/json")
            .with_header(OFFLINE_RESPONSE_HEADER, "true")
            .with_body(self.offline_search.clone())
    }

    pub fn unavailable(&self) -> Response {
        Response::new(503)
            .with_header("Content-Type", "text/plain")
            .with_body(UNAVAILABLE_BODY)
    }
}

/// Whether a response is the synthetic offline search payload.
pub fn is_offline_payload(response: &Response) -> bool {
    response.header(OFFLINE_RESPONSE_HEADER) == Some("true")
}
