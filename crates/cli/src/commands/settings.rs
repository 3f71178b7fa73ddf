//! Settings commands.
//!
//! `set` writes one field through the same merge the admin API uses, so the
//! write timestamp is refreshed and untouched fields keep their values.

use chrono::Utc;
use kirana_core::SettingsPatch;
use kirana_storefront::db::SettingsRepository;
use serde_json::{Map, Value};

use super::{CommandError, connect};

/// Print the effective settings as pretty JSON.
pub async fn show() -> Result<(), CommandError> {
    let store = connect().await?;
    let settings = SettingsRepository::new(&store).get().await?;
    let json = serde_json::to_string_pretty(&settings)
        .map_err(|e| CommandError::InvalidValue(e.to_string()))?;

    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }
    Ok(())
}

/// Set one settings field to a JSON value.
pub async fn set(key: &str, raw: &str) -> Result<(), CommandError> {
    let patch = patch_for(key, raw)?;

    let store = connect().await?;
    let settings = SettingsRepository::new(&store)
        .update(patch, Utc::now())
        .await?;

    tracing::info!(
        field = key,
        updated_at = settings.updated_at.as_deref().unwrap_or_default(),
        "Settings updated"
    );
    Ok(())
}

/// Build a single-field patch, rejecting unknown or server-owned fields.
fn patch_for(key: &str, raw: &str) -> Result<SettingsPatch, CommandError> {
    if key == "updatedAt" {
        return Err(CommandError::InvalidValue(
            "updatedAt is set automatically".to_string(),
        ));
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| CommandError::InvalidValue(format!("{raw} is not JSON: {e}")))?;

    let mut object = Map::new();
    object.insert(key.to_string(), value);
    let patch: SettingsPatch = serde_json::from_value(Value::Object(object))
        .map_err(|e| CommandError::InvalidValue(format!("{key}: {e}")))?;

    if patch.is_empty() {
        return Err(CommandError::InvalidValue(format!(
            "unknown settings field: {key}"
        )));
    }
    Ok(patch)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_for_known_field() {
        let patch = patch_for("currency", "\"USD\"").unwrap();
        assert_eq!(patch.currency.as_deref(), Some("USD"));
        assert_eq!(
            patch,
            SettingsPatch {
                currency: Some("USD".to_string()),
                ..SettingsPatch::default()
            }
        );
    }

    #[test]
    fn test_patch_for_typed_field() {
        let patch = patch_for("maintenanceMode", "true").unwrap();
        assert_eq!(patch.maintenance_mode, Some(true));
        assert!(patch_for("maintenanceMode", "\"yes\"").is_err());
    }

    #[test]
    fn test_patch_for_rejects_unknown_and_server_fields() {
        assert!(matches!(
            patch_for("storeNmae", "\"Kirana\""),
            Err(CommandError::InvalidValue(_))
        ));
        assert!(patch_for("updatedAt", "\"2026-01-01T00:00:00Z\"").is_err());
        assert!(patch_for("currency", "USD").is_err());
    }
}
