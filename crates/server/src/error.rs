//! HTTP error mapping for the API routes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use packrat_core::Error;

/// Wrapper turning core errors into HTTP responses for the store API.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidInput(_) | Error::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            Error::CacheMiss(_) => StatusCode::NOT_FOUND,
            Error::FetchTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}
