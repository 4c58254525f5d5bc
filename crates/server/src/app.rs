//! Router assembly and shared state.

use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::gateway;
use crate::routes;

/// Shared handles for the HTTP layer.
#[derive(Clone)]
pub struct AppState {
    pub db: packrat_core::CacheDb,
    pub worker: Arc<packrat_worker::Worker>,
    pub origin: Url,
}

/// Build the gateway router: the form-store API plus the catch-all gateway
/// route that funnels everything else through the worker.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/store", get(routes::store::list_items))
        .route(
            "/api/store/{key}",
            get(routes::store::get_item)
                .put(routes::store::put_item)
                .delete(routes::store::delete_item),
        )
        .fallback(gateway::handle)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
