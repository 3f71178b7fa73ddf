//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness
//! GET    /health/ready              - Store readiness
//!
//! # Catalog
//! GET    /api/products              - Filtered, sorted, cursor-paginated listing
//! GET    /api/products/{id}         - Product detail
//! GET    /api/settings              - Effective store settings
//!
//! # Wishlist (x-user-id)
//! GET    /api/wishlist              - Current user's wishlist
//! POST   /api/wishlist/toggle       - Add or remove a product
//!
//! # Checkout (rate limited)
//! POST   /api/payment/create-order  - Create a gateway order
//! POST   /api/payment/verify        - Verify a payment signature
//!
//! # Notifications (rate limited)
//! POST   /api/email                 - Relay an HTML email
//!
//! # Admin (bearer token)
//! POST   /api/admin/products        - Create product
//! PUT    /api/admin/products/{id}   - Replace product fields
//! DELETE /api/admin/products/{id}   - Delete product
//! PATCH  /api/admin/settings        - Merge settings fields
//! ```

pub mod admin;
pub mod email;
pub mod payment;
pub mod products;
pub mod settings;
pub mod wishlist;

use axum::{
    Router,
    extract::FromRequest,
    routing::{get, post, put},
};

use crate::error::AppError;
use crate::state::AppState;

/// JSON body extractor whose rejections use the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Catalog, settings and wishlist routes.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/settings", get(settings::show))
        .route("/wishlist", get(wishlist::show))
        .route("/wishlist/toggle", post(wishlist::toggle))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/create-order", post(payment::create_order))
        .route("/verify", post(payment::verify))
}

/// Create the email relay router.
pub fn email_routes() -> Router<AppState> {
    Router::new().route("/", post(email::send))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(admin::create_product))
        .route(
            "/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/settings", axum::routing::patch(admin::update_settings))
}
