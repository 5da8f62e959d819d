//! CLI command implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use sqlx::PgPool;
use thiserror::Error;

use shopping_cart_api::config::{ConfigError, get_database_url};
use shopping_cart_api::db::{self, RepositoryError};
use shopping_cart_api::services::password::PasswordError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The store rejected an operation.
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// An argument failed validation.
    #[error("Invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Connect to the database named by `CART_DATABASE_URL` (or `DATABASE_URL`).
///
/// # Errors
///
/// Returns an error if the URL is not set or the connection fails.
pub async fn connect() -> Result<PgPool, CommandError> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let database_url = get_database_url("CART_DATABASE_URL")?;
    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
