//! Cart domain types and the total cost computation.

use rust_decimal::Decimal;

use shopping_cart_core::{CartId, Price, UserId};

use super::CartItem;

/// A user's single cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cart {
    pub id: CartId,
    /// Owning user; at most one cart per user.
    pub user: UserId,
}

/// Fields for inserting a cart.
#[derive(Debug, Clone, Copy)]
pub struct NewCart {
    pub user: UserId,
}

/// Fields to change on an existing cart; `None` leaves the field as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartChanges {
    pub user: Option<UserId>,
}

impl Cart {
    /// Apply changes in place.
    pub const fn apply(&mut self, changes: CartChanges) {
        if let Some(user) = changes.user {
            self.user = user;
        }
    }
}

/// Restricts a cart listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartFilter {
    /// Only the cart owned by this user.
    pub user: Option<UserId>,
}

/// A cart item together with the unit price of the item it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub cart_item: CartItem,
    pub unit_price: Price,
}

impl CartLine {
    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.line_total(self.cart_item.quantity)
    }
}

/// Total cost of a cart: the sum of `price * quantity` over its lines.
///
/// An empty cart costs zero.
#[must_use]
pub fn total_cost(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::line_total).sum()
}
