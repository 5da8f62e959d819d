//! HTTP route handlers for the cart API.
//!
//! # Route Structure
//!
//! Every path also answers with a trailing slash.
//!
//! ```text
//! GET  /                          - API root (collection URLs)
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (store ping)
//!
//! # Items
//! GET|POST                /admin/items
//! GET|PUT|PATCH|DELETE    /admin/items/{id}
//!
//! # Carts
//! GET|POST                /carts            (?user=<id>)
//! GET                     /carts/cart_id    (?user=<id>)
//! GET|PUT|PATCH|DELETE    /carts/{id}
//! GET                     /carts/{id}/total_cost
//!
//! # Cart items
//! GET|POST                /cartitems        (?user=<id>&cart=<id>)
//! GET|PUT|PATCH|DELETE    /cartitems/{id}
//!
//! # Users
//! GET|POST                /users
//! GET                     /users/available_items
//! GET|PUT|PATCH|DELETE    /users/{id}
//! ```

pub mod cart_items;
pub mod carts;
pub mod items;
pub mod users;


use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{FromRequest, FromRequestParts, Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header::HOST, request::Parts},
    routing::get,
};
use serde_json::{Map, Value};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

use shopping_cart_core::FieldErrors;

use crate::error::{ApiError, Result};
use crate::serializers::{Body, type_name};
use crate::state::AppState;

/// Collections listed by the API root, by path.
const COLLECTIONS: [&str; 4] = ["admin/items", "carts", "cartitems", "users"];

// =============================================================================
// Extractors
// =============================================================================

/// A JSON object request body.
///
/// Malformed JSON is a 400; a body that is valid JSON but not an object is a
/// validation error.
#[derive(Debug)]
pub struct JsonBody(pub Body);

impl<S: Send + Sync> FromRequest<S> for JsonBody {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        match value {
            Value::Object(body) => Ok(Self(body)),
            other => Err(ApiError::Invalid(FieldErrors::single(
                FieldErrors::NON_FIELD,
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    type_name(&other)
                ),
            ))),
        }
    }
}

/// The query string as ordered `(name, value)` pairs.
///
/// A repeated parameter is not an error: the last occurrence wins.
#[derive(Debug, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// The last value given for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for QueryParams {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(pairs))
    }
}

/// The raw `{id}` segment of a detail route.
///
/// A segment that cannot be decoded is a JSON 400 like every other error.
#[derive(Debug)]
pub struct PathId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for PathId {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(id))
    }
}

/// Parse a path id. Anything that is not a valid id cannot name a record.
fn parse_id<T: FromStr>(raw: &str, entity: &str) -> Result<T> {
    raw.parse().map_err(|_| ApiError::not_found(entity))
}

/// Parse an optional list filter from the query string.
fn parse_filter<T: FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>> {
    raw.map(|value| {
        value
            .trim()
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("invalid {name} parameter '{value}'")))
    })
    .transpose()
}

// =============================================================================
// Routers
// =============================================================================

/// Create the item routes router.
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(items::list).post(items::create))
        .route(
            "/{id}",
            get(items::retrieve)
                .put(items::update)
                .patch(items::partial_update)
                .delete(items::destroy),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(carts::list).post(carts::create))
        .route("/cart_id", get(carts::cart_id))
        .route(
            "/{id}",
            get(carts::retrieve)
                .put(carts::update)
                .patch(carts::partial_update)
                .delete(carts::destroy),
        )
        .route("/{id}/total_cost", get(carts::total_cost))
}

/// Create the cart item routes router.
pub fn cart_item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart_items::list).post(cart_items::create))
        .route(
            "/{id}",
            get(cart_items::retrieve)
                .put(cart_items::update)
                .patch(cart_items::partial_update)
                .delete(cart_items::destroy),
        )
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list).post(users::create))
        .route("/available_items", get(users::available_items))
        .route(
            "/{id}",
            get(users::retrieve)
                .put(users::update)
                .patch(users::partial_update)
                .delete(users::destroy),
        )
}

/// Create all resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(api_root))
        .nest("/admin/items", item_routes())
        .nest("/carts", cart_routes())
        .nest("/cartitems", cart_item_routes())
        .nest("/users", user_routes())
}

/// Build the complete application: resources, health checks and middleware.
///
/// Trailing slashes are trimmed before routing, so the result must be served
/// as a whole rather than nested into another router.
pub fn app(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

// =============================================================================
// Handlers
// =============================================================================

/// API root: the absolute URL of every collection.
async fn api_root(headers: HeaderMap) -> Json<Map<String, Value>> {
    let base = headers
        .get(HOST)
        .and_then(|host| host.to_str().ok())
        .map_or_else(String::new, |host| format!("http://{host}"));

    Json(
        COLLECTIONS
            .iter()
            .map(|path| ((*path).to_owned(), Value::String(format!("{base}/{path}/"))))
            .collect(),
    )
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Store not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
