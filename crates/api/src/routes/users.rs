//! User route handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use shopping_cart_core::UserId;

use super::{JsonBody, PathId, parse_id};
use crate::error::{ApiError, Result};
use crate::serializers::{Body, ItemRepresentation, UserRepresentation, user};
use crate::state::AppState;

const ENTITY: &str = "User";

/// Body of `GET /users/available_items`.
#[derive(Debug, Serialize)]
pub struct AvailableItems {
    pub available_items: Vec<ItemRepresentation>,
}

/// List every user.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<UserRepresentation>>> {
    let users = state.store().list_users().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Create a user; the password is hashed before it is stored.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<UserRepresentation>)> {
    let new = user::validate_new(&body)?;
    let user = state.store().create_user(new).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Show one user.
#[instrument(skip(state))]
pub async fn retrieve(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<UserRepresentation>> {
    let id: UserId = parse_id(&id, ENTITY)?;
    let user = state
        .store()
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found(ENTITY))?;
    Ok(Json(user.into()))
}

async fn save(
    state: &AppState,
    id: &str,
    body: &Body,
    partial: bool,
) -> Result<Json<UserRepresentation>> {
    let id: UserId = parse_id(id, ENTITY)?;
    // A missing record is a 404 even when the body is also invalid
    if state.store().get_user(id).await?.is_none() {
        return Err(ApiError::not_found(ENTITY));
    }
    let changes = user::validate_changes(body, partial)?;
    let user = state
        .store()
        .update_user(id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(ENTITY))?;
    tracing::info!(user_id = %user.id, partial, "User updated");
    Ok(Json(user.into()))
}

/// Replace a user's username and password.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> Result<Json<UserRepresentation>> {
    save(&state, &id, &body, false).await
}

/// Change the fields present in the body.
#[instrument(skip(state, body))]
pub async fn partial_update(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> Result<Json<UserRepresentation>> {
    save(&state, &id, &body, true).await
}

/// Delete a user together with their cart and its items.
#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, PathId(id): PathId) -> Result<StatusCode> {
    let id: UserId = parse_id(&id, ENTITY)?;
    if !state.store().delete_user(id).await? {
        return Err(ApiError::not_found(ENTITY));
    }
    tracing::info!(user_id = %id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Every item in the catalog.
#[instrument(skip(state))]
pub async fn available_items(State(state): State<AppState>) -> Result<Json<AvailableItems>> {
    let items = state.store().list_items().await?;
    Ok(Json(AvailableItems {
        available_items: items.into_iter().map(Into::into).collect(),
    }))
}
