//! Unified error handling with Sentry integration.
//!
//! Handlers return `Result<T, ApiError>`. Server-side failures are captured to
//! Sentry and logged before a generic body goes back to the client; client
//! errors are rendered as JSON the caller can act on.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use shopping_cart_core::FieldErrors;

use crate::db::RepositoryError;

/// Application-level error type for the cart API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Record or related record not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request is missing something the handler needs.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body failed validation.
    #[error("Invalid input: {0}")]
    Invalid(FieldErrors),

    /// The store rejected the write.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(FieldErrors),

    /// Store operation failed.
    #[error("Repository error: {0}")]
    Repository(RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// The 404 for a record that does not exist.
    #[must_use]
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("No {entity} matches the given query."))
    }

    /// The HTTP status this error answers with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::Invalid(_) | Self::ConstraintViolation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Repository(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Constraint(fields) => Self::ConstraintViolation(fields),
            other => Self::Repository(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Repository(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let body = match self {
            Self::NotFound(message) => json!({ "error": [message] }),
            Self::BadRequest(message) => json!({ "error": message }),
            Self::Invalid(fields) | Self::ConstraintViolation(fields) => json!(fields),
            Self::Repository(_) | Self::Internal(_) => json!({ "error": "Internal server error" }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;
