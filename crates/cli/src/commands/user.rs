//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a user
//! cart-cli user create -u alice -p secret
//!
//! # Create a user together with an empty cart
//! cart-cli user create -u alice -p secret --with-cart
//! ```
//!
//! # Environment Variables
//!
//! - `CART_DATABASE_URL` - `PostgreSQL` connection string

use shopping_cart_api::db::{PgStore, Store};
use shopping_cart_api::models::{NewCart, NewUser};
use shopping_cart_api::serializers::user::PASSWORD_MAX_LENGTH;
use shopping_cart_api::services::password::hash_password;
use shopping_cart_core::{UserId, Username};

use super::{CommandError, connect};

/// Check a password against the limits the API enforces.
fn validate_password(password: &str) -> Result<(), CommandError> {
    if password.trim().is_empty() {
        return Err(CommandError::Invalid {
            field: "password",
            message: "may not be blank".to_owned(),
        });
    }
    if password.chars().count() > PASSWORD_MAX_LENGTH {
        return Err(CommandError::Invalid {
            field: "password",
            message: format!("must be at most {PASSWORD_MAX_LENGTH} characters"),
        });
    }
    Ok(())
}

/// Create a new user, optionally with an empty cart.
///
/// # Arguments
///
/// * `username` - Login name (letters, digits and `@ . + - _`)
/// * `password` - Plain-text password, hashed before storage
/// * `with_cart` - Also create the user's cart
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns an error if the input is invalid, the username is taken, or the
/// database is unreachable.
pub async fn create(
    username: &str,
    password: &str,
    with_cart: bool,
) -> Result<UserId, CommandError> {
    let username = Username::parse(username).map_err(|e| CommandError::Invalid {
        field: "username",
        message: e.to_string(),
    })?;
    validate_password(password)?;

    let store = PgStore::new(connect().await?);
    let user = store
        .create_user(NewUser {
            username,
            password_hash: hash_password(password)?,
        })
        .await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User created");

    if with_cart {
        let cart = store.create_cart(NewCart { user: user.id }).await?;
        tracing::info!(cart_id = %cart.id, "Cart created");
    }

    Ok(user.id)
}
