//! Cart route handlers.
//!
//! Carts render with their items nested and a computed `total_cost`, so every
//! read also loads the cart's lines.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use tracing::instrument;

use shopping_cart_core::{CartId, UserId};

use super::{JsonBody, PathId, QueryParams, parse_filter, parse_id};
use crate::error::{ApiError, Result};
use crate::models::{Cart, CartFilter, total_cost as sum_lines};
use crate::serializers::cart::{self, CartIdResponse, TotalCost};
use crate::serializers::{Body, CartRepresentation};
use crate::state::AppState;

const ENTITY: &str = "Cart";

/// Render a cart with its lines.
async fn represent(state: &AppState, cart: Cart) -> Result<CartRepresentation> {
    let lines = state.store().cart_lines(cart.id).await?;
    Ok(CartRepresentation::new(cart, &lines))
}

async fn find(state: &AppState, id: &str) -> Result<Cart> {
    let id: CartId = parse_id(id, ENTITY)?;
    state
        .store()
        .get_cart(id)
        .await?
        .ok_or_else(|| ApiError::not_found(ENTITY))
}

/// List carts, optionally only the one owned by `?user=`.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    query: QueryParams,
) -> Result<Json<Vec<CartRepresentation>>> {
    let filter = CartFilter {
        user: parse_filter("user", query.get("user"))?,
    };
    let carts = state.store().list_carts(filter).await?;

    let mut rendered = Vec::with_capacity(carts.len());
    for cart in carts {
        rendered.push(represent(&state, cart).await?);
    }
    Ok(Json(rendered))
}

/// Create a cart for a user.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<CartRepresentation>)> {
    let new = cart::validate_new(&body)?;
    let cart = state.store().create_cart(new).await?;
    tracing::info!(cart_id = %cart.id, user_id = %cart.user, "Cart created");
    Ok((StatusCode::CREATED, Json(represent(&state, cart).await?)))
}

/// Show one cart.
#[instrument(skip(state))]
pub async fn retrieve(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<CartRepresentation>> {
    let cart = find(&state, &id).await?;
    Ok(Json(represent(&state, cart).await?))
}

async fn save(
    state: &AppState,
    id: &str,
    body: &Body,
    partial: bool,
) -> Result<Json<CartRepresentation>> {
    let existing = find(state, id).await?;
    let changes = cart::validate_changes(body, partial)?;
    let cart = state
        .store()
        .update_cart(existing.id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(ENTITY))?;
    tracing::info!(cart_id = %cart.id, user_id = %cart.user, partial, "Cart updated");
    Ok(Json(represent(state, cart).await?))
}

/// Replace a cart's owner.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> Result<Json<CartRepresentation>> {
    save(&state, &id, &body, false).await
}

/// Change the fields present in the body.
#[instrument(skip(state, body))]
pub async fn partial_update(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> Result<Json<CartRepresentation>> {
    save(&state, &id, &body, true).await
}

/// Delete a cart and its items.
#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, PathId(id): PathId) -> Result<StatusCode> {
    let id: CartId = parse_id(&id, ENTITY)?;
    if !state.store().delete_cart(id).await? {
        return Err(ApiError::not_found(ENTITY));
    }
    tracing::info!(cart_id = %id, "Cart deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Sum of price times quantity over the cart's items.
#[instrument(skip(state))]
pub async fn total_cost(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<TotalCost>> {
    let cart = find(&state, &id).await?;
    let lines = state.store().cart_lines(cart.id).await?;
    Ok(Json(TotalCost {
        total_cost: sum_lines(&lines),
    }))
}

/// The id of the cart owned by `?user=`.
#[instrument(skip(state))]
pub async fn cart_id(
    State(state): State<AppState>,
    query: QueryParams,
) -> Result<Json<CartIdResponse>> {
    let raw = query
        .get("user")
        .ok_or_else(|| ApiError::BadRequest("user parameter required".to_owned()))?;
    let cart = resolve_user_cart(&state, raw.trim().parse().ok(), raw).await?;
    Ok(Json(CartIdResponse { cart: cart.id }))
}

/// The cart owned by `user`, or the 404 for an unusable user reference.
///
/// `raw` is how the client spelled the user, for the error message.
pub(super) async fn resolve_user_cart(
    state: &AppState,
    user: Option<UserId>,
    raw: &str,
) -> Result<Cart> {
    let cart = match user {
        Some(user) => state.store().cart_for_user(user).await?,
        None => None,
    };
    cart.ok_or_else(|| {
        ApiError::NotFound(format!(
            "Invalid user '{raw}' - user does not exist or user does not have an associated cart"
        ))
    })
}
