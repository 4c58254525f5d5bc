//! Request descriptors and response snapshots.

use serde::{Deserialize, Serialize};
use url::Url;

/// Read-only descriptor of an intercepted resource request.
///
/// The dispatch path never mutates a request; the descriptor carries no body,
/// which limits interception to bodyless methods.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    /// Absolute URL of the requested resource.
    pub url: Url,
    /// HTTP method, uppercase.
    pub method: String,
    /// Request headers as name/value pairs.
    pub headers: Vec<(String, String)>,
}

impl ResourceRequest {
    /// A headerless GET request, the common case on the dispatch path.
    pub fn get(url: Url) -> Self {
        Self { url, method: "GET".to_string(), headers: Vec::new() }
    }

    /// Path component of the request URL.
    pub fn path(&self) -> &str {
        self.url.path()
    }
}

/// Full response snapshot: status, headers, body.
///
/// This is both what the cache persists and what the executors return.
/// Cloning yields an independently readable copy, so the stored entry and
/// the copy handed to the caller never alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers as name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl ResourceResponse {
    /// An empty response with the given status.
    pub fn new(status: u16) -> Self {
        Self { status, headers: Vec::new(), body: Vec::new() }
    }

    /// Builder-style header append.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Builder-style body replacement.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Fabricated 503 returned when both the network and the cache fail to
    /// satisfy a request. The requester never observes a raw network error.
    pub fn synthetic_unavailable() -> Self {
        Self::new(503)
            .with_header("content-type", "text/plain; charset=utf-8")
            .with_body("Service Unavailable")
    }

    /// Fabricated 502 for a pass-through request whose upstream was
    /// unreachable.
    pub fn bad_gateway() -> Self {
        Self::new(502)
            .with_header("content-type", "text/plain; charset=utf-8")
            .with_body("Bad Gateway")
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_request() {
        let request = ResourceRequest::get(Url::parse("http://origin.local/app.js").unwrap());
        assert_eq!(request.method, "GET");
        assert_eq!(request.path(), "/app.js");
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_synthetic_unavailable() {
        let response = ResourceResponse::synthetic_unavailable();
        assert_eq!(response.status, 503);
        assert!(!response.is_success());
        assert_eq!(response.body, b"Service Unavailable");
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let response = ResourceResponse::new(200).with_header("Content-Type", "text/html");
        assert_eq!(response.header("content-type"), Some("text/html"));
        assert_eq!(response.header("x-missing"), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = ResourceResponse::new(200).with_body("body");
        let mut copy = original.clone();
        copy.body.clear();
        assert_eq!(original.body, b"body");
    }
}
