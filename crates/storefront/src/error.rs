//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Every error renders as the
//! JSON envelope `{"error": "..."}`; server-side failures are captured to
//! Sentry before the response is produced.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kirana_core::{AmountError, CursorError, EmailError as AddressError, ProductValidationError};
use serde_json::json;
use thiserror::Error;

use crate::payments::GatewayError;
use crate::services::EmailError;
use crate::store::StoreError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad or missing client input.
    #[error("{0}")]
    Validation(String),

    /// Caller is not authenticated.
    #[error("{0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Rate limited.
    #[error("Too many requests")]
    RateLimited,

    /// Payment gateway failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Mail relay failed.
    #[error(transparent)]
    Mail(#[from] EmailError),

    /// Document store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Gateway(_) | Self::Mail(_) | Self::Store(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the client.
    ///
    /// Gateway and mail messages are passed through; store and internal
    /// details stay in the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Store(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Capture server-side failures to Sentry and the log.
    pub(crate) fn report(&self) {
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();
        let body = Json(json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<AmountError> for AppError {
    fn from(err: AmountError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<CursorError> for AppError {
    fn from(err: CursorError) -> Self {
        Self::Validation(format!("Invalid cursor: {err}"))
    }
}

impl From<AddressError> for AppError {
    fn from(err: AddressError) -> Self {
        Self::Validation(format!("Invalid recipient: {err}"))
    }
}

impl From<ProductValidationError> for AppError {
    fn from(err: ProductValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for a storefront action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}
