//! Request identity extractors.
//!
//! End users are authenticated by the upstream identity provider, which
//! forwards the verified uid in `x-user-id`. Admin routes require the
//! configured bearer token.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use kirana_core::UserId;
use secrecy::ExposeSecret;

use crate::error::AppError;
use crate::payments::signature::constant_time_compare;
use crate::state::AppState;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

const MAX_USER_ID_LEN: usize = 128;

/// Extractor that requires an authenticated end user.
///
/// ```rust,ignore
/// async fn handler(RequireUser(user_id): RequireUser) -> impl IntoResponse {
///     user_id.to_string()
/// }
/// ```
pub struct RequireUser(pub UserId);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.len() <= MAX_USER_ID_LEN)
            .ok_or_else(|| AppError::Unauthorized("Sign in required".to_string()))?;

        sentry::configure_scope(|scope| {
            scope.set_user(Some(sentry::User {
                id: Some(user_id.to_string()),
                ..Default::default()
            }));
        });

        Ok(Self(UserId::new(user_id)))
    }
}

/// Extractor that requires the admin bearer token.
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        let expected = state.config().admin_api_token.expose_secret();
        if !constant_time_compare(expected, token) {
            tracing::warn!(path = %parts.uri.path(), "Rejected admin token");
            return Err(AppError::Unauthorized("Invalid bearer token".to_string()));
        }

        Ok(Self)
    }
}
