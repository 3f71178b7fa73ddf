//! Public settings route.

use axum::{Json, extract::State};
use kirana_core::AppSettings;

use crate::db::SettingsRepository;
use crate::error::Result;
use crate::state::AppState;

/// Effective store settings (stored fields over defaults).
pub async fn show(State(state): State<AppState>) -> Result<Json<AppSettings>> {
    let settings = SettingsRepository::new(state.store()).get().await?;
    Ok(Json(settings))
}
