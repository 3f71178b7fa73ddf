//! End-to-end tests for the Kirana storefront.
//!
//! These tests talk HTTP to a running server and are `#[ignore]`d by
//! default.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations to the database the server will use
//! export STOREFRONT_DATABASE_URL=postgres://localhost/kirana
//! cargo run -p kirana-cli -- migrate
//!
//! # Start the storefront with rate limiting off
//! STOREFRONT_RATE_LIMIT=false cargo run -p kirana-storefront
//!
//! # Run integration tests
//! cargo test -p kirana-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - Server under test (default: <http://localhost:3000>)
//! - `ADMIN_API_TOKEN` - Same token the server was started with; admin
//!   tests are skipped without it

use reqwest::Client;
use serde_json::Value;

/// Base URL of the storefront under test.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Admin bearer token, if configured.
#[must_use]
pub fn admin_token() -> Option<String> {
    std::env::var("ADMIN_API_TOKEN").ok().filter(|t| !t.is_empty())
}

/// Absolute URL for a path on the storefront.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", storefront_base_url())
}

/// HTTP client for tests.
#[must_use]
pub fn client() -> Client {
    Client::new()
}

/// Ids of the products in a listing page body.
#[must_use]
pub fn product_ids(page: &Value) -> Vec<String> {
    page["products"]
        .as_array()
        .map(|products| {
            products
                .iter()
                .filter_map(|p| p["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// A user id no other test run will reuse.
#[must_use]
pub fn unique_user() -> String {
    format!("it-{}", uuid::Uuid::new_v4())
}
