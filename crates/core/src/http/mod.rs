//! Request/response model shared by the store, the network and the engine.
//!
//! A [`Request`] is identified only by its canonical absolute URL; that string
//! is both the fetch target and the store key. A [`Response`] is a complete
//! snapshot (status, headers, body) so it can be cloned into the store while
//! the original goes back to the caller.

pub mod url;

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;

pub use self::url::{UrlError, canonicalize};
use crate::Error;

/// An intercepted request, keyed by its canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Request {
    url: ::url::Url,
}

impl Request {
    /// Build a request from an already-parsed URL. The fragment is dropped.
    pub fn new(mut url: ::url::Url) -> Self {
        url.set_fragment(None);
        Self { url }
    }

    /// Parse a request target, resolving paths against `base`.
    pub fn parse(input: &str, base: Option<&::url::Url>) -> Result<Self, Error> {
        let url = canonicalize(input, base).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self { url })
    }

    pub fn url(&self) -> &::url::Url {
        &self.url
    }

    /// Store key for this request.
    pub fn key(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// A fetched, stored, or synthesized response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Header pairs in arrival order; names keep their original case
    pub headers: Vec<(String, String)>,
    /// Response body bytes
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self { status, headers: Vec::new(), body: Bytes::new() }
    }

    /// Status 200 with no body.
    pub fn empty_ok() -> Self {
        Self::new(200)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The network seam.
///
/// Implementations resolve with a response for every HTTP status and reject
/// only when no response could be obtained at all (the `NetworkFailure` case).
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_identity_ignores_fragment() {
        let a = Request::parse("https://example.com/page?x=1#one", None).unwrap();
        let b = Request::parse("https://example.com/page?x=1#two", None).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.key(), "https://example.com/page?x=1");
    }

    #[test]
    fn test_request_new_drops_fragment() {
        let url = ::url::Url::parse("https://example.com/a#b").unwrap();
        assert_eq!(Request::new(url).key(), "https://example.com/a");
    }

    #[test]
    fn test_request_parse_invalid() {
        let result = Request::parse("ftp://example.com", None);
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_response_header_lookup_is_case_insensitive() {
        let response = Response::new(200).with_header("Content-Type", "text/css");
        assert_eq!(response.content_type(), Some("text/css"));
        assert_eq!(response.header("CONTENT-TYPE"), Some("text/css"));
        assert_eq!(response.header("etag"), None);
    }

    #[test]
    fn test_response_success_range() {
        assert!(Response::new(200).is_success());
        assert!(Response::new(204).is_success());
        assert!(!Response::new(304).is_success());
        assert!(!Response::new(503).is_success());
    }

    #[test]
    fn test_empty_ok() {
        let response = Response::empty_ok();
        assert_eq!(response.status, 200);
        assert!(response.body.is_empty());
        assert!(response.text().is_empty());
    }
}
