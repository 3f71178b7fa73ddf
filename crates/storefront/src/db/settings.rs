//! Settings repository for the `settings/global` singleton.

use chrono::{DateTime, Utc};
use kirana_core::{AppSettings, SettingsPatch, StoredTimestamp, format_timestamp};
use tracing::instrument;

use crate::store::{Document, DocumentStore, SETTINGS, StoreError};

/// Id of the singleton settings document.
pub const GLOBAL: &str = "global";

/// Repository for global store settings.
pub struct SettingsRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Read the effective settings: stored fields laid over the defaults.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails or the document is malformed.
    #[instrument(skip(self))]
    pub async fn get(&self) -> Result<AppSettings, StoreError> {
        let Some(data) = self.store.get(SETTINGS, GLOBAL).await? else {
            return Ok(AppSettings::default());
        };
        let stored: SettingsPatch = Document {
            id: GLOBAL.to_string(),
            data,
        }
        .decode(SETTINGS)?;
        Ok(AppSettings::default().merged_with(stored))
    }

    /// Merge the supplied fields into the stored document, stamping
    /// `updatedAt`, and return the effective settings.
    ///
    /// Fields absent from `patch` keep their stored values.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write or the follow-up read fails.
    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        mut patch: SettingsPatch,
        now: DateTime<Utc>,
    ) -> Result<AppSettings, StoreError> {
        patch.updated_at = Some(StoredTimestamp::Text(format_timestamp(now)));
        let data = serde_json::to_value(&patch)?;
        self.store.merge(SETTINGS, GLOBAL, &data).await?;
        tracing::info!("Settings updated");
        self.get().await
    }
}
