//! Cart item domain types.

use shopping_cart_core::{CartId, CartItemId, ItemId, Quantity, UserId};

/// One item, in some quantity, in one cart. `(cart, item)` is unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart: CartId,
    pub item: ItemId,
    pub quantity: Quantity,
}

/// Fields for inserting a cart item.
#[derive(Debug, Clone, Copy)]
pub struct NewCartItem {
    pub cart: CartId,
    pub item: ItemId,
    pub quantity: Quantity,
}

/// Fields to change on an existing cart item; `None` leaves the field as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartItemChanges {
    pub cart: Option<CartId>,
    pub item: Option<ItemId>,
    pub quantity: Option<Quantity>,
}

impl CartItem {
    /// Apply changes in place.
    pub const fn apply(&mut self, changes: CartItemChanges) {
        if let Some(cart) = changes.cart {
            self.cart = cart;
        }
        if let Some(item) = changes.item {
            self.item = item;
        }
        if let Some(quantity) = changes.quantity {
            self.quantity = quantity;
        }
    }
}

/// Restricts a cart item listing. Both filters combine conjunctively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartItemFilter {
    /// Only items in the cart owned by this user.
    pub user: Option<UserId>,
    /// Only items in this cart.
    pub cart: Option<CartId>,
}
