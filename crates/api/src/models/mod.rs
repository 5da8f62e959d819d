//! Domain models for the cart service.
//!
//! These types represent validated records separate from their wire shapes
//! (see [`crate::serializers`]) and their database rows (see [`crate::db`]).

pub mod cart;
pub mod cart_item;
pub mod item;
pub mod user;

pub use cart::{Cart, CartChanges, CartFilter, CartLine, NewCart, total_cost};
pub use cart_item::{CartItem, CartItemChanges, CartItemFilter, NewCartItem};
pub use item::{Item, ItemChanges, NewItem};
pub use user::{NewUser, User, UserChanges};
