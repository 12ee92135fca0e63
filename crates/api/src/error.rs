//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures storage failures to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`. Expected failures (invalid OTP, rejected status
//! change) are surfaced to the client without error-level logging.

use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::services::orders::OrderError;
use crate::services::otp::OtpError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// OTP issue/verify failed.
    #[error("OTP error: {0}")]
    Otp(#[from] OtpError),

    /// Identity resolution or token issuance failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart mutation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Order placement or transition failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this failure is the backend's fault and worth a Sentry event.
    const fn is_server_fault(&self) -> bool {
        match self {
            Self::Database(_) | Self::Internal(_) => true,
            Self::Otp(err) => matches!(err, OtpError::Repository(_)),
            Self::Auth(err) => matches!(err, AuthError::Repository(_)),
            Self::Cart(err) => matches!(err, CartError::Repository(_)),
            Self::Order(err) => matches!(err, OrderError::Repository(_)),
            _ => false,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // The mobile clients expect OTP rejection as a plain 400
            Self::Otp(err) => match err {
                OtpError::InvalidOrExpired => StatusCode::BAD_REQUEST,
                OtpError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(err) => match err {
                AuthError::IdentityConflict => StatusCode::CONFLICT,
                AuthError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Cart(err) => match err {
                CartError::ItemPriceNotFound => StatusCode::NOT_FOUND,
                CartError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Order(err) => match err {
                OrderError::NoActiveCart => StatusCode::BAD_REQUEST,
                OrderError::OrderNotFound => StatusCode::NOT_FOUND,
                OrderError::InvalidTransition { .. } => StatusCode::CONFLICT,
                OrderError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn client_message(&self) -> String {
        match self {
            // Don't expose internal error details to clients
            Self::Database(_)
            | Self::Internal(_)
            | Self::Otp(OtpError::Repository(_))
            | Self::Auth(AuthError::Repository(_))
            | Self::Cart(CartError::Repository(_))
            | Self::Order(OrderError::Repository(_)) => "Internal server error".to_string(),
            Self::Otp(OtpError::InvalidOrExpired) => "Invalid or expired OTP.".to_string(),
            Self::Auth(AuthError::IdentityConflict) => {
                "An account with this email already exists".to_string()
            }
            Self::Cart(CartError::ItemPriceNotFound) => "Item price not found".to_string(),
            Self::Order(err) => err.to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::Unauthorized(_) => "Authentication required".to_string(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let status = self.status_code();
        let body = Json(json!({
            "success": false,
            "message": self.client_message(),
        }));

        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// JSON body extractor whose rejection uses the standard error shape.
///
/// Axum's bare `Json` rejects malformed bodies with a plain-text 422; the
/// clients expect every failure as `{"success": false, "message": ...}`,
/// so handlers take their request bodies through this wrapper instead.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
