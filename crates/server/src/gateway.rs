//! The gateway route.
//!
//! Converts incoming HTTP requests into intercepted-request descriptors,
//! dispatches them through the worker, and converts the resulting snapshot
//! back into an HTTP response.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use packrat_core::{ResourceRequest, ResourceResponse};

use crate::app::AppState;

/// Request headers that are connection-scoped and must not be forwarded.
const HOP_HEADERS: &[&str] = &["connection", "content-length", "host", "keep-alive", "transfer-encoding"];

/// Catch-all handler: every request that is not an API route flows through
/// the worker. The descriptor carries no body, so only GET and HEAD are
/// proxied.
pub async fn handle(State(state): State<AppState>, method: Method, uri: Uri, headers: HeaderMap) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let url = match packrat_client::resolve_target(&state.origin, target) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(target = %target, error = %e, "unresolvable request target");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let request = ResourceRequest {
        url,
        method: method.as_str().to_string(),
        headers: headers
            .iter()
            .filter(|(name, _)| !HOP_HEADERS.contains(&name.as_str()))
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect(),
    };

    let snapshot = state.worker.handle(&request).await;
    to_http(snapshot, method == Method::HEAD)
}

/// Build the HTTP response from a snapshot; HEAD responses keep the headers
/// and drop the body.
fn to_http(snapshot: ResourceResponse, head_only: bool) -> Response {
    let mut builder = axum::http::Response::builder().status(snapshot.status);
    for (name, value) in &snapshot.headers {
        builder = builder.header(name, value);
    }

    let body = if head_only { Body::empty() } else { Body::from(snapshot.body) };

    builder
        .body(body)
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_http_preserves_status_and_headers() {
        let snapshot = ResourceResponse::new(404)
            .with_header("content-type", "text/plain")
            .with_body("not found");

        let response = to_http(snapshot, false);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers().get("content-type").unwrap(), "text/plain");
    }

    #[test]
    fn test_to_http_head_drops_body() {
        let snapshot = ResourceResponse::new(200).with_body("payload");
        let response = to_http(snapshot, true);
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_to_http_invalid_header_becomes_500() {
        let snapshot = ResourceResponse::new(200).with_header("bad header name", "x");
        let response = to_http(snapshot, false);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
