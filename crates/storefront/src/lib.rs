//! Kirana storefront API.
//!
//! The router is exposed as a library so the binary, router tests and the
//! CLI share one definition.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod payments;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

use axum::{
    Router,
    extract::State,
    http::{HeaderName, HeaderValue, Method, StatusCode},
    middleware::{from_fn, map_response},
    routing::get,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::{
    USER_ID_HEADER, checkout_rate_limiter, email_rate_limiter, rate_limit_envelope,
    request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Build the complete application router.
pub fn app(state: AppState) -> Router {
    let rate_limit = state.config().rate_limit;

    let mut payment = routes::payment_routes();
    let mut email = routes::email_routes();
    if rate_limit {
        payment = payment
            .layer(checkout_rate_limiter())
            .layer(map_response(rate_limit_envelope));
        email = email
            .layer(email_rate_limiter())
            .layer(map_response(rate_limit_envelope));
    }

    let cors = cors_layer(&state.config().allowed_origins);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", routes::catalog_routes())
        .nest("/api/payment", payment)
        .nest("/api/email", email)
        .nest("/api/admin", routes::admin_routes())
        .with_state(state)
        .layer(cors)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// CORS for the configured browser origins. Unparseable origins are
/// skipped with a warning.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            HeaderName::from_static(USER_ID_HEADER),
        ])
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the document store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
