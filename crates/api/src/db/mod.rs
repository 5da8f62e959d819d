//! Entity store for users, items, carts and cart items.
//!
//! # Tables
//!
//! - `users` - Shopper accounts (`username` unique)
//! - `items` - Catalog (`price NUMERIC(6, 2)`, non-negative)
//! - `carts` - One per user (`user_id` unique, cascades from `users`)
//! - `cart_items` - Cart lines (`(cart_id, item_id)` unique, cascades from
//!   `carts` and `items`)
//!
//! # Backends
//!
//! - [`PgStore`] - `PostgreSQL`; constraints and cascades live in the schema
//! - [`MemoryStore`] - in-process maps enforcing the same rules
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p shopping-cart-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use shopping_cart_core::{CartId, CartItemId, FieldErrors, ItemId, UserId};

use crate::models::{
    Cart, CartChanges, CartFilter, CartItem, CartItemChanges, CartItemFilter, CartLine, Item,
    ItemChanges, NewCart, NewCartItem, NewItem, NewUser, User, UserChanges,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Uniqueness or reference constraint violated.
    #[error("constraint violation: {0}")]
    Constraint(FieldErrors),
}

/// Persistence operations for every entity.
///
/// `get_*` and `update_*` return `Ok(None)` when the record does not exist;
/// `delete_*` return whether a record was removed. Lists are ordered by id.
#[async_trait]
pub trait Store: Send + Sync {
    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    // Users
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    async fn create_user(&self, new: NewUser) -> Result<User, RepositoryError>;
    async fn update_user(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<User>, RepositoryError>;
    /// Deletes the user, their cart and its cart items.
    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError>;

    // Items
    async fn list_items(&self) -> Result<Vec<Item>, RepositoryError>;
    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, RepositoryError>;
    async fn create_item(&self, new: NewItem) -> Result<Item, RepositoryError>;
    async fn update_item(
        &self,
        id: ItemId,
        changes: ItemChanges,
    ) -> Result<Option<Item>, RepositoryError>;
    /// Deletes the item and every cart item referencing it.
    async fn delete_item(&self, id: ItemId) -> Result<bool, RepositoryError>;

    // Carts
    async fn list_carts(&self, filter: CartFilter) -> Result<Vec<Cart>, RepositoryError>;
    async fn get_cart(&self, id: CartId) -> Result<Option<Cart>, RepositoryError>;
    async fn cart_for_user(&self, user: UserId) -> Result<Option<Cart>, RepositoryError>;
    async fn create_cart(&self, new: NewCart) -> Result<Cart, RepositoryError>;
    async fn update_cart(
        &self,
        id: CartId,
        changes: CartChanges,
    ) -> Result<Option<Cart>, RepositoryError>;
    /// Deletes the cart and its cart items.
    async fn delete_cart(&self, id: CartId) -> Result<bool, RepositoryError>;
    /// The cart's items, each with the unit price of its item.
    async fn cart_lines(&self, cart: CartId) -> Result<Vec<CartLine>, RepositoryError>;

    // Cart items
    async fn list_cart_items(
        &self,
        filter: CartItemFilter,
    ) -> Result<Vec<CartItem>, RepositoryError>;
    async fn get_cart_item(&self, id: CartItemId) -> Result<Option<CartItem>, RepositoryError>;
    async fn create_cart_item(&self, new: NewCartItem) -> Result<CartItem, RepositoryError>;
    async fn update_cart_item(
        &self,
        id: CartItemId,
        changes: CartItemChanges,
    ) -> Result<Option<CartItem>, RepositoryError>;
    async fn delete_cart_item(&self, id: CartItemId) -> Result<bool, RepositoryError>;
}

/// Constraint failure messages shared by every backend.
pub(crate) mod violation {
    use shopping_cart_core::FieldErrors;

    use super::RepositoryError;

    pub fn duplicate_username() -> RepositoryError {
        RepositoryError::Constraint(FieldErrors::single(
            "username",
            "A user with that username already exists.",
        ))
    }

    pub fn duplicate_cart() -> RepositoryError {
        RepositoryError::Constraint(FieldErrors::single(
            "user",
            "cart with this user already exists.",
        ))
    }

    pub fn duplicate_cart_item() -> RepositoryError {
        RepositoryError::Constraint(FieldErrors::single(
            FieldErrors::NON_FIELD,
            "The fields cart, item must make a unique set.",
        ))
    }

    pub fn missing_reference(field: &str, id: impl std::fmt::Display) -> RepositoryError {
        RepositoryError::Constraint(FieldErrors::single(
            field,
            format!("Invalid pk \"{id}\" - object does not exist."),
        ))
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply the embedded migrations from `crates/api/migrations/`.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history is inconsistent.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
