use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use kissune_cards::models::{CustomCardUpdate, NewCustomCard};
use kissune_cards::{Category, ItemType};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the id of the submitter making an edit.
const SUBMITTER_HEADER: &str = "x-submitter-id";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCardsParams {
    pub item_type: Option<ItemType>,
    pub category: Option<Category>,
}

/// GET /api/cards?itemType=frames&category=regular
///
/// The merged listing, optionally filtered. An empty list means the gallery
/// is temporarily unavailable or genuinely empty; clients keep polling.
pub async fn list_cards(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListCardsParams>,
) -> Result<Json<Value>, AppError> {
    let cards: Vec<_> = state
        .gallery
        .cards()
        .await?
        .into_iter()
        .filter(|c| params.item_type.is_none_or(|t| c.item_type == t))
        .filter(|c| params.category.is_none_or(|cat| c.category == cat))
        .collect();

    let count = cards.len();
    Ok(Json(json!({ "data": cards, "count": count })))
}

/// GET /api/cards/{id}
pub async fn get_card(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    match state.gallery.card(&id).await? {
        Some(card) => Ok(Json(json!({ "data": card }))),
        None => Err(AppError::not_found("Card not found")),
    }
}

/// POST /api/cards
///
/// Register an upload whose image is already hosted.
pub async fn create_card(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewCustomCard>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let card = state.gallery.create_custom(body).await?;
    log::info!("Created custom {} ({})", card.id, card.name);
    Ok((StatusCode::CREATED, Json(json!({ "data": card }))))
}

/// PATCH /api/cards/{id}
///
/// Only the card's submitter may edit it.
pub async fn update_card(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<CustomCardUpdate>,
) -> Result<Json<Value>, AppError> {
    authorize(&state, &id, &headers).await?;
    match state.gallery.update_custom(&id, body).await? {
        Some(card) => Ok(Json(json!({ "data": card }))),
        None => Err(AppError::not_found("Card not found")),
    }
}

/// DELETE /api/cards/{id}
///
/// Only the card's submitter may delete it.
pub async fn delete_card(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    authorize(&state, &id, &headers).await?;
    if state.gallery.delete_custom(&id).await? {
        log::info!("Deleted custom {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Card not found"))
    }
}

async fn authorize(state: &AppState, id: &str, headers: &HeaderMap) -> Result<(), AppError> {
    let caller = headers
        .get(SUBMITTER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::forbidden("Missing submitter"))?;

    let card = state
        .gallery
        .custom(id)
        .await?
        .ok_or_else(|| AppError::not_found("Card not found"))?;

    if card.submitter_id.as_deref() == Some(caller) {
        Ok(())
    } else {
        Err(AppError::forbidden("Only the submitter can change this card"))
    }
}
