//! Seed the catalog from a YAML file.
//!
//! The file lists products by stable id and may carry a settings block:
//!
//! ```yaml
//! settings:
//!   storeName: Kirana
//! products:
//!   - id: masala-chai-250g
//!     name: Masala Chai 250g
//!     price: "249.00"
//!     category: tea
//!     popularity: 120
//! ```
//!
//! Products are upserted by id, so seeding the same file twice leaves the
//! catalog unchanged apart from products without an explicit `createdAt`.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use kirana_core::{Product, ProductDraft, ProductId, SettingsPatch};
use kirana_storefront::db::{ProductRepository, SettingsRepository};
use serde::Deserialize;
use tracing::{error, info};

use super::{CommandError, connect};

/// Top-level shape of a catalog file.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub settings: Option<SettingsPatch>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// One product entry with its stable id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedProduct {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub draft: ProductDraft,
}

/// Validate every entry and build the products to write.
///
/// Returns all problems at once rather than stopping at the first one.
fn prepare(file: CatalogFile, now: DateTime<Utc>) -> Result<Vec<Product>, Vec<String>> {
    let mut seen = HashSet::new();
    let mut products = Vec::with_capacity(file.products.len());
    let mut errors = Vec::new();

    for (index, entry) in file.products.into_iter().enumerate() {
        let id = entry.id.trim().to_string();
        if id.is_empty() {
            errors.push(format!("product #{}: id is required", index + 1));
            continue;
        }
        if !seen.insert(id.clone()) {
            errors.push(format!("{id}: duplicate id"));
            continue;
        }
        match entry.draft.validate() {
            Ok(draft) => {
                let created_at = entry.created_at.unwrap_or(now);
                products.push(draft.into_product(ProductId::new(id), created_at));
            }
            Err(e) => errors.push(format!("{id}: {e}")),
        }
    }

    if errors.is_empty() {
        Ok(products)
    } else {
        Err(errors)
    }
}

/// Seed products and settings from `file_path`.
///
/// The file is read and validated before connecting to the database.
pub async fn catalog(file_path: &str, dry_run: bool) -> Result<(), CommandError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading catalog from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: file_path.to_string(),
            source,
        })?;
    let mut file: CatalogFile = serde_yaml::from_str(&content)?;
    let settings = file.settings.take().filter(|patch| !patch.is_empty());

    let products = prepare(file, Utc::now()).map_err(|errors| {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        CommandError::Validation(errors.len())
    })?;

    info!(products = products.len(), settings = settings.is_some(), "Catalog validated");
    if dry_run {
        info!("Dry run, nothing written");
        return Ok(());
    }

    let store = connect().await?;
    let repo = ProductRepository::new(&store);
    for product in &products {
        repo.put(product).await?;
    }
    info!("  Products written: {}", products.len());

    if let Some(patch) = settings {
        SettingsRepository::new(&store).update(patch, Utc::now()).await?;
        info!("  Settings updated");
    }

    info!("Seeding complete!");
    Ok(())
}
