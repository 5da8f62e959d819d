//! Password hashing.
//!
//! Passwords are stored as Argon2 PHC strings with a random salt per hash.
//! Nothing in the API ever returns them.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Errors that can occur while hashing a password.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Argon2 rejected the input or parameters.
    #[error("password hashing error: {0}")]
    Hash(argon2::password_hash::Error),
}

/// Hash a password with Argon2 and a fresh salt.
///
/// # Errors
///
/// Returns `PasswordError::Hash` if Argon2 fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hash)
}

/// Check a password against a stored hash.
///
/// Returns `false` for a wrong password and for a hash that does not parse.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
