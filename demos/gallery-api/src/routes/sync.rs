use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/sync
///
/// Returns when the catalog feeds were last fetched, or `null` before the
/// first listing.
pub async fn get_sync(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let last_sync = state.gallery.last_sync().await?;
    Ok(Json(json!({ "lastSync": last_sync })))
}
