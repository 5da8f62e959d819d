//! Integration tests for the shopping cart API.
//!
//! These tests drive a running server over HTTP. Each test creates its own
//! uniquely named records and deletes them afterwards, so they can share a
//! database with other data.
//!
//! # Running Tests
//!
//! ```bash
//! # Start a server over PostgreSQL (exercises the schema constraints)
//! cargo run -p shopping-cart-cli -- migrate
//! cargo run -p shopping-cart-api
//!
//! # ...or over the in-memory store, which needs no database
//! CART_STORE=memory cargo run -p shopping-cart-api
//!
//! # Run integration tests
//! CART_API_BASE_URL=http://localhost:8000 cargo test -p shopping-cart-integration-tests -- --ignored
//! ```

use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};
use thiserror::Error;
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("CART_API_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// A username no other test run will use.
#[must_use]
pub fn unique_username(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

/// HTTP client bound to the API under test.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

/// Errors from a test helper call.
#[derive(Debug, Error)]
pub enum HelperError {
    /// The request did not complete.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with an unexpected status.
    #[error("unexpected status {0}: {1}")]
    Status(StatusCode, Value),
    /// The response lacked an `id`.
    #[error("response has no id: {0}")]
    MissingId(Value),
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Create a context for the configured server.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: base_url(),
        }
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET` a path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get(&self, path: &str) -> Result<Response, HelperError> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// `POST` a JSON body to a path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Response, HelperError> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }

    /// `PATCH` a JSON body to a path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn patch(&self, path: &str, body: &Value) -> Result<Response, HelperError> {
        Ok(self.client.patch(self.url(path)).json(body).send().await?)
    }

    /// `DELETE` a path.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete(&self, path: &str) -> Result<Response, HelperError> {
        Ok(self.client.delete(self.url(path)).send().await?)
    }

    /// Create a record and return its id.
    async fn create(&self, path: &str, body: &Value) -> Result<i64, HelperError> {
        let resp = self.post(path, body).await?;
        let status = resp.status();
        let value: Value = resp.json().await?;
        if status != StatusCode::CREATED {
            return Err(HelperError::Status(status, value));
        }
        value["id"].as_i64().ok_or(HelperError::MissingId(value))
    }

    /// Create a user with a fresh username.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn create_user(&self) -> Result<i64, HelperError> {
        self.create(
            "/users/",
            &json!({ "username": unique_username("it"), "password": "testpassword" }),
        )
        .await
    }

    /// Create a user together with a cart; returns `(user, cart)`.
    ///
    /// # Errors
    ///
    /// Returns an error if a request fails or is rejected.
    pub async fn create_user_with_cart(&self) -> Result<(i64, i64), HelperError> {
        let user = self.create_user().await?;
        let cart = self.create("/carts/", &json!({ "user": user })).await?;
        Ok((user, cart))
    }

    /// Create an item.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn create_item(&self, name: &str, price: &str) -> Result<i64, HelperError> {
        self.create(
            "/admin/items/",
            &json!({ "name": name, "description": format!("{name} description"), "price": price }),
        )
        .await
    }

    /// Put an item in a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn create_cart_item(
        &self,
        cart: i64,
        item: i64,
        quantity: i64,
    ) -> Result<i64, HelperError> {
        self.create(
            "/cartitems/",
            &json!({ "cart": cart, "item": item, "quantity": quantity }),
        )
        .await
    }
}
