//! Cart item representation and input validation.

use serde::Serialize;

use shopping_cart_core::{CartId, CartItemId, ItemId, Quantity};

use super::{Body, FieldReader};
use crate::error::ApiError;
use crate::models::{CartItem, CartItemChanges, NewCartItem};

/// A cart item as rendered to clients, with its references as bare ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartItemRepresentation {
    pub id: CartItemId,
    pub cart: CartId,
    pub item: ItemId,
    pub quantity: Quantity,
}

impl From<CartItem> for CartItemRepresentation {
    fn from(cart_item: CartItem) -> Self {
        Self {
            id: cart_item.id,
            cart: cart_item.cart,
            item: cart_item.item,
            quantity: cart_item.quantity,
        }
    }
}

fn read(reader: &mut FieldReader<'_>) -> (Option<CartId>, Option<ItemId>, Option<Quantity>) {
    (
        reader.primary_key("cart"),
        reader.primary_key("item"),
        reader.quantity("quantity"),
    )
}

/// Validate a create body. `quantity` defaults to one.
///
/// # Errors
///
/// Returns `ApiError::Invalid` listing every bad field.
pub fn validate_new(body: &Body) -> Result<NewCartItem, ApiError> {
    let mut reader = FieldReader::new(body);
    let (cart, item, quantity) = read(&mut reader);
    reader.finish(|| {
        Some(NewCartItem {
            cart: cart?,
            item: item?,
            quantity: quantity.unwrap_or_default(),
        })
    })
}

/// Validate an update body. A missing `quantity` is left unchanged.
///
/// # Errors
///
/// Returns `ApiError::Invalid` listing every bad field.
pub fn validate_changes(body: &Body, partial: bool) -> Result<CartItemChanges, ApiError> {
    let mut reader = if partial {
        FieldReader::partial(body)
    } else {
        FieldReader::new(body)
    };
    let (cart, item, quantity) = read(&mut reader);
    reader.finish(|| {
        Some(CartItemChanges {
            cart,
            item,
            quantity,
        })
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn body(value: Value) -> Body {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_representation_uses_bare_ids() {
        let cart_item = CartItem {
            id: CartItemId::new(4),
            cart: CartId::new(1),
            item: ItemId::new(2),
            quantity: Quantity::new(2).unwrap(),
        };
        let json = serde_json::to_value(CartItemRepresentation::from(cart_item)).unwrap();
        assert_eq!(json, json!({ "id": 4, "cart": 1, "item": 2, "quantity": 2 }));
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        let new = validate_new(&body(json!({ "cart": 1, "item": 2 }))).unwrap();
        assert_eq!(new.quantity.get(), 1);
    }

    #[test]
    fn test_full_update_keeps_missing_quantity() {
        let changes = validate_changes(&body(json!({ "cart": 1, "item": 2 })), false).unwrap();
        assert_eq!(changes.cart, Some(CartId::new(1)));
        assert!(changes.quantity.is_none());
    }

    #[test]
    fn test_rejects_bad_references() {
        let result = validate_new(&body(json!({ "cart": "one", "quantity": -2 })));
        let Err(ApiError::Invalid(errors)) = result else {
            panic!("expected validation failure");
        };
        assert_eq!(
            errors.get("cart").unwrap(),
            ["Incorrect type. Expected pk value, received str."]
        );
        assert_eq!(errors.get("item").unwrap(), ["This field is required."]);
        assert_eq!(
            errors.get("quantity").unwrap(),
            ["Ensure this value is greater than or equal to 1."]
        );
    }
}
