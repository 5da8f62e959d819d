//! Catalog item route handlers, mounted under `/admin/items`.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use tracing::instrument;

use shopping_cart_core::ItemId;

use super::{JsonBody, PathId, parse_id};
use crate::error::{ApiError, Result};
use crate::serializers::{Body, ItemRepresentation, item};
use crate::state::AppState;

const ENTITY: &str = "Item";

/// List every item.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ItemRepresentation>>> {
    let items = state.store().list_items().await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// Create an item.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<ItemRepresentation>)> {
    let new = item::validate_new(&body)?;
    let item = state.store().create_item(new).await?;
    tracing::info!(item_id = %item.id, price = %item.price, "Item created");
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// Show one item.
#[instrument(skip(state))]
pub async fn retrieve(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<ItemRepresentation>> {
    let id: ItemId = parse_id(&id, ENTITY)?;
    let item = state
        .store()
        .get_item(id)
        .await?
        .ok_or_else(|| ApiError::not_found(ENTITY))?;
    Ok(Json(item.into()))
}

async fn save(
    state: &AppState,
    id: &str,
    body: &Body,
    partial: bool,
) -> Result<Json<ItemRepresentation>> {
    let id: ItemId = parse_id(id, ENTITY)?;
    if state.store().get_item(id).await?.is_none() {
        return Err(ApiError::not_found(ENTITY));
    }
    let changes = item::validate_changes(body, partial)?;
    let item = state
        .store()
        .update_item(id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(ENTITY))?;
    tracing::info!(item_id = %item.id, partial, "Item updated");
    Ok(Json(item.into()))
}

/// Replace an item's fields.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> Result<Json<ItemRepresentation>> {
    save(&state, &id, &body, false).await
}

/// Change the fields present in the body.
#[instrument(skip(state, body))]
pub async fn partial_update(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> Result<Json<ItemRepresentation>> {
    save(&state, &id, &body, true).await
}

/// Delete an item; cart items referencing it go with it.
#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, PathId(id): PathId) -> Result<StatusCode> {
    let id: ItemId = parse_id(&id, ENTITY)?;
    if !state.store().delete_item(id).await? {
        return Err(ApiError::not_found(ENTITY));
    }
    tracing::info!(item_id = %id, "Item deleted");
    Ok(StatusCode::NO_CONTENT)
}
