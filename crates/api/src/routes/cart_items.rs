//! Cart item route handlers.
//!
//! Creating a cart item accepts a `user` in place of `cart`: the user's cart
//! is looked up and used instead.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde_json::Value;
use tracing::instrument;

use shopping_cart_core::{CartItemId, UserId};

use super::carts::resolve_user_cart;
use super::{JsonBody, PathId, QueryParams, parse_filter, parse_id};
use crate::error::{ApiError, Result};
use crate::models::CartItemFilter;
use crate::serializers::{Body, CartItemRepresentation, cart_item};
use crate::state::AppState;

const ENTITY: &str = "CartItem";

/// List cart items, narrowed by `?user=` and/or `?cart=`.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    query: QueryParams,
) -> Result<Json<Vec<CartItemRepresentation>>> {
    let filter = CartItemFilter {
        user: parse_filter("user", query.get("user"))?,
        cart: parse_filter("cart", query.get("cart"))?,
    };
    let cart_items = state.store().list_cart_items(filter).await?;
    Ok(Json(cart_items.into_iter().map(Into::into).collect()))
}

/// A `user` reference from a request body, as an id and as the client wrote it.
fn user_reference(value: &Value) -> (Option<UserId>, String) {
    match value {
        Value::String(s) => (s.trim().parse().ok(), s.clone()),
        Value::Number(n) => (
            n.as_i64()
                .and_then(|i| i32::try_from(i).ok())
                .map(UserId::new),
            n.to_string(),
        ),
        other => (None, other.to_string()),
    }
}

/// Create a cart item in an explicit `cart`, or in the cart of `user`.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(mut body): JsonBody,
) -> Result<(StatusCode, Json<CartItemRepresentation>)> {
    if let Some(user) = body.remove("user").filter(|value| !value.is_null()) {
        let (id, raw) = user_reference(&user);
        let cart = resolve_user_cart(&state, id, &raw).await?;
        body.insert("cart".to_owned(), Value::from(cart.id.as_i32()));
    }

    let new = cart_item::validate_new(&body)?;
    let cart_item = state.store().create_cart_item(new).await?;
    tracing::info!(
        cart_item_id = %cart_item.id,
        cart_id = %cart_item.cart,
        item_id = %cart_item.item,
        quantity = %cart_item.quantity,
        "Cart item created"
    );
    Ok((StatusCode::CREATED, Json(cart_item.into())))
}

/// Show one cart item.
#[instrument(skip(state))]
pub async fn retrieve(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<CartItemRepresentation>> {
    let id: CartItemId = parse_id(&id, ENTITY)?;
    let cart_item = state
        .store()
        .get_cart_item(id)
        .await?
        .ok_or_else(|| ApiError::not_found(ENTITY))?;
    Ok(Json(cart_item.into()))
}

async fn save(
    state: &AppState,
    id: &str,
    body: &Body,
    partial: bool,
) -> Result<Json<CartItemRepresentation>> {
    let id: CartItemId = parse_id(id, ENTITY)?;
    if state.store().get_cart_item(id).await?.is_none() {
        return Err(ApiError::not_found(ENTITY));
    }
    let changes = cart_item::validate_changes(body, partial)?;
    let cart_item = state
        .store()
        .update_cart_item(id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(ENTITY))?;
    tracing::info!(
        cart_item_id = %cart_item.id,
        quantity = %cart_item.quantity,
        partial,
        "Cart item updated"
    );
    Ok(Json(cart_item.into()))
}

/// Replace a cart item's fields.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> Result<Json<CartItemRepresentation>> {
    save(&state, &id, &body, false).await
}

/// Change the fields present in the body.
#[instrument(skip(state, body))]
pub async fn partial_update(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> Result<Json<CartItemRepresentation>> {
    save(&state, &id, &body, true).await
}

/// Delete a cart item.
#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, PathId(id): PathId) -> Result<StatusCode> {
    let id: CartItemId = parse_id(&id, ENTITY)?;
    if !state.store().delete_cart_item(id).await? {
        return Err(ApiError::not_found(ENTITY));
    }
    tracing::info!(cart_item_id = %id, "Cart item deleted");
    Ok(StatusCode::NO_CONTENT)
}
