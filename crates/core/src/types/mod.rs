//! Core types for the shopping cart.
//!
//! This module provides type-safe wrappers for the cart domain concepts.

pub mod field_errors;
pub mod id;
pub mod price;
pub mod quantity;
pub mod username;

pub use field_errors::FieldErrors;
pub use id::*;
pub use price::{Price, PriceError, format_fixed};
pub use quantity::{Quantity, QuantityError};
pub use username::{Username, UsernameError};
