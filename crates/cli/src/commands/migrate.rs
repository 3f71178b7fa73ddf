//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! kirana-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded at
//! compile time:
//! ```text
//! migrations/
//! ├── 20261019000001_create_documents.sql
//! └── 20261019000002_product_indexes.sql
//! ```

use super::{CommandError, connect};

/// Apply pending storefront migrations.
pub async fn run() -> Result<(), CommandError> {
    let store = connect().await?;

    tracing::info!("Running storefront migrations...");
    store.migrate().await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
