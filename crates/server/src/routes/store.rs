//! Form-store endpoints.
//!
//! Thin wrappers over the key-value table in the cache database; the
//! offline form UI is the intended caller.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;
use packrat_core::{Error, StoredItem};

/// Body for `PUT /api/store/{key}`.
#[derive(Debug, Deserialize)]
pub struct PutItemBody {
    pub value: String,
}

/// `GET /api/store` - every stored item, ordered by key.
pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<StoredItem>>, ApiError> {
    let items = state.db.list_items().await?;
    Ok(Json(items))
}

/// `GET /api/store/{key}` - one item, or 404.
pub async fn get_item(
    State(state): State<AppState>, Path(key): Path<String>,
) -> Result<Json<StoredItem>, ApiError> {
    let item = state
        .db
        .get_item(&key)
        .await?
        .ok_or_else(|| Error::CacheMiss(key.clone()))?;
    Ok(Json(item))
}

/// `PUT /api/store/{key}` - insert or update.
pub async fn put_item(
    State(state): State<AppState>, Path(key): Path<String>, Json(body): Json<PutItemBody>,
) -> Result<StatusCode, ApiError> {
    state.db.put_item(&key, &body.value).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/store/{key}` - idempotent delete.
pub async fn delete_item(
    State(state): State<AppState>, Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.delete_item(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}
