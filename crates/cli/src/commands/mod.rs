//! Command implementations.

pub mod migrate;
pub mod seed;
pub mod settings;

use kirana_storefront::store::{PgDocumentStore, StoreError};
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Document store error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Input file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Input file is not valid YAML for the expected shape.
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid JSON value or settings field.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Catalog file failed validation.
    #[error("{0} validation errors found")]
    Validation(usize),
}

/// Connect to the storefront document store.
///
/// Reads `STOREFRONT_DATABASE_URL`, falling back to `DATABASE_URL`.
pub async fn connect() -> Result<PgDocumentStore, CommandError> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    tracing::info!("Connecting to storefront database...");
    Ok(PgDocumentStore::connect(&database_url).await?)
}
