//! Wishlist route handlers.

use axum::{Json, extract::State};
use chrono::Utc;
use kirana_core::{ProductId, Toggle, Wishlist, WishlistItem};
use serde::{Deserialize, Serialize};

use super::ApiJson;
use crate::db::WishlistRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

/// Get the current user's wishlist.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<Wishlist>> {
    let wishlist = WishlistRepository::new(state.store()).get(&user_id).await?;
    Ok(Json(wishlist))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub product_id: String,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    /// `"added"` or `"removed"`.
    pub status: &'static str,
    pub items: Vec<WishlistItem>,
}

/// Add the product to the wishlist, or remove it if already present.
pub async fn toggle(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    ApiJson(body): ApiJson<ToggleRequest>,
) -> Result<Json<ToggleResponse>> {
    let product_id = body.product_id.trim();
    if product_id.is_empty() {
        return Err(AppError::Validation("productId is required".to_string()));
    }

    let (outcome, wishlist) = WishlistRepository::new(state.store())
        .toggle(&user_id, &ProductId::new(product_id), Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let status = match outcome {
        Toggle::Added => "added",
        Toggle::Removed => "removed",
    };

    Ok(Json(ToggleResponse {
        status,
        items: wishlist.items,
    }))
}
