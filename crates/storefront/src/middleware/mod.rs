//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. CORS
//! 6. Rate limiting (governor) on checkout and email routes only

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{RequireAdmin, RequireUser, USER_ID_HEADER};
pub use rate_limit::{checkout_rate_limiter, email_rate_limiter, rate_limit_envelope};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
