//! Shopping Cart Core - Shared domain types.
//!
//! This crate provides the types shared by every shopping cart component:
//! - `api` - The REST service (HTTP handlers, stores, serializers)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. Database encode/decode impls are gated behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, quantities, usernames and
//!   field-level validation errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
