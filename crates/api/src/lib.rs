//! Shopping Cart API library.
//!
//! This crate provides the REST service as a library, allowing it to be
//! tested in process and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod serializers;
pub mod services;
pub mod state;
