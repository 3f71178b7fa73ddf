//! Admin route handlers for catalog and settings management.
//!
//! Every handler requires [`RequireAdmin`].

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use kirana_core::{AppSettings, Product, ProductDraft, ProductId, SettingsPatch};

use super::ApiJson;
use crate::db::{ProductRepository, SettingsRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Product not found".to_string())
}

/// Create a product.
#[tracing::instrument(skip_all)]
pub async fn create_product(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<ProductDraft>,
) -> Result<(StatusCode, Json<Product>)> {
    let draft = draft.validate()?;
    let product = ProductRepository::new(state.store())
        .create(draft, Utc::now())
        .await?;
    add_breadcrumb("admin", "Product created", &[("product_id", product.id.as_str())]);
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product's editable fields.
#[tracing::instrument(skip(_admin, state, draft))]
pub async fn update_product(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(draft): ApiJson<ProductDraft>,
) -> Result<Json<Product>> {
    let draft = draft.validate()?;
    ProductRepository::new(state.store())
        .update(&ProductId::new(id), draft)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Delete a product. Wishlist snapshots of it are left in place.
#[tracing::instrument(skip(_admin, state))]
pub async fn delete_product(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = ProductId::new(id);
    if ProductRepository::new(state.store()).delete(&id).await? {
        add_breadcrumb("admin", "Product deleted", &[("product_id", id.as_str())]);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}

/// Merge the supplied settings fields.
#[tracing::instrument(skip_all)]
pub async fn update_settings(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(mut patch): ApiJson<SettingsPatch>,
) -> Result<Json<AppSettings>> {
    // The server owns the write timestamp.
    patch.updated_at = None;
    if patch.is_empty() {
        return Err(AppError::Validation("No settings fields supplied".to_string()));
    }

    let settings = SettingsRepository::new(state.store())
        .update(patch, Utc::now())
        .await?;
    Ok(Json(settings))
}
