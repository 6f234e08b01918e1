//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Each variant maps to one
//! [`ErrorCode`] and HTTP status, and is rendered as
//!
//! ```json
//! {"error": {"code": "NOT_FOUND", "message": "Product not found", "details": {...}}}
//! ```
//!
//! Server errors are captured to Sentry before responding; their details are
//! never sent to the client.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::services::{AuthError, CartError, OrderError};

/// Machine-readable error code carried in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    ValidationError,
    InsufficientStock,
    InvalidStateTransition,
    InternalError,
    ServiceUnavailable,
}

impl ErrorCode {
    /// HTTP status for this code.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::BadRequest
            | Self::ValidationError
            | Self::InsufficientStock
            | Self::InvalidStateTransition => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Application-level error type for the API.
///
/// `Forbidden`, `Conflict`, `ServiceUnavailable` and `Internal` are not raised
/// by any handler yet; they complete the [`ErrorCode`] table. `Internal`
/// responses are captured to Sentry.
#[derive(Debug, Error)]
pub enum AppError {
    /// Order workflow failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Malformed request (bad JSON, bad query string).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Well-formed request with missing or invalid fields.
    #[error("Validation error: {0}")]
    Validation(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Temporarily unable to serve.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The error code sent to the client.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Order(err) => match err {
                OrderError::UserNotFound(_)
                | OrderError::OrderNotFound(_)
                | OrderError::ProductNotFound(_) => ErrorCode::NotFound,
                OrderError::EmptyOrder
                | OrderError::InvalidQuantity(_)
                | OrderError::TotalOverflow => ErrorCode::ValidationError,
                OrderError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
                OrderError::NotCancellable(_) | OrderError::InvalidTransition(_) => {
                    ErrorCode::InvalidStateTransition
                }
            },
            Self::Cart(err) => match err {
                CartError::ProductNotFound(_) | CartError::ItemNotFound(_) => ErrorCode::NotFound,
                CartError::InvalidQuantity => ErrorCode::ValidationError,
                CartError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            },
            Self::Auth(_) | Self::Unauthorized(_) => ErrorCode::Unauthorized,
            Self::BadRequest(_) => ErrorCode::BadRequest,
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::Forbidden(_) => ErrorCode::Forbidden,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Conflict(_) => ErrorCode::Conflict,
            Self::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// The human-readable message sent to the client.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Order(err) => err.to_string(),
            Self::Cart(err) => err.to_string(),
            Self::Auth(AuthError::InvalidCredentials) => "Invalid email or password".to_owned(),
            Self::Auth(AuthError::SessionNotFound) => "Invalid or expired token".to_owned(),
            Self::Internal(_) => "Internal server error".to_owned(),
            Self::BadRequest(msg)
            | Self::Validation(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::ServiceUnavailable(msg) => msg.clone(),
        }
    }

    /// Structured details for errors that carry more than a message.
    #[must_use]
    pub fn details(&self) -> Option<Value> {
        match self {
            Self::Order(OrderError::InsufficientStock {
                product_id,
                available,
                requested,
                ..
            })
            | Self::Cart(CartError::InsufficientStock {
                product_id,
                available,
                requested,
            }) => Some(json!({
                "productId": product_id,
                "available": available,
                "requested": requested,
            })),
            Self::Order(OrderError::InvalidTransition(err)) => Some(json!({
                "from": err.from,
                "to": err.to,
                "allowed": err.from.allowed_transitions(),
            })),
            Self::Order(OrderError::NotCancellable(status)) => Some(json!({
                "status": status,
            })),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();

        // Capture server errors to Sentry
        if code == ErrorCode::InternalError {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, code = ?code, "Request rejected");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message: self.message(),
                details: self.details(),
            },
        };

        (code.status(), Json(body)).into_response()
    }
}

// =============================================================================
// Extractor rejections
// =============================================================================

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // parses, but does not fit the request type
            JsonRejection::JsonDataError(err) => Self::Validation(err.body_text()),
            other => Self::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the current request.
pub fn set_sentry_user(user_id: &impl ToString, email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: Some(email.to_owned()),
            ..Default::default()
        }));
    });
}
