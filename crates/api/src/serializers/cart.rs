//! Cart representation and input validation.

use rust_decimal::Decimal;
use serde::Serialize;

use shopping_cart_core::{CartId, UserId, format_fixed};

use super::{Body, CartItemRepresentation, FieldReader};
use crate::error::ApiError;
use crate::models::{Cart, CartChanges, CartLine, NewCart, total_cost};

/// A cart as rendered to clients: its lines nested, its cost computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartRepresentation {
    pub id: CartId,
    pub user: UserId,
    pub items: Vec<CartItemRepresentation>,
    /// Fixed two-decimal string, e.g. `"50.00"`.
    pub total_cost: String,
}

impl CartRepresentation {
    /// Render a cart from its lines.
    #[must_use]
    pub fn new(cart: Cart, lines: &[CartLine]) -> Self {
        Self {
            id: cart.id,
            user: cart.user,
            items: lines
                .iter()
                .map(|line| CartItemRepresentation::from(line.cart_item))
                .collect(),
            total_cost: format_fixed(total_cost(lines)),
        }
    }
}

/// Body of `GET /carts/{id}/total_cost`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TotalCost {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_cost: Decimal,
}

/// Body of `GET /carts/cart_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartIdResponse {
    pub cart: CartId,
}

/// Validate a create body.
///
/// # Errors
///
/// Returns `ApiError::Invalid` listing every bad field.
pub fn validate_new(body: &Body) -> Result<NewCart, ApiError> {
    let mut reader = FieldReader::new(body);
    let user = reader.primary_key("user");
    reader.finish(|| Some(NewCart { user: user? }))
}

/// Validate an update body.
///
/// # Errors
///
/// Returns `ApiError::Invalid` listing every bad field.
pub fn validate_changes(body: &Body, partial: bool) -> Result<CartChanges, ApiError> {
    let mut reader = if partial {
        FieldReader::partial(body)
    } else {
        FieldReader::new(body)
    };
    let user = reader.primary_key("user");
    reader.finish(|| Some(CartChanges { user }))
}
