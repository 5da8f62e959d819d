//! Business logic services for the cart API.
//!
//! # Services
//!
//! - `password` - Argon2 hashing of user passwords

pub mod password;
