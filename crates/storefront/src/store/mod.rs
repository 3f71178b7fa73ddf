//! Schemaless document storage.
//!
//! Everything the storefront persists (products, wishlists, settings) is a
//! JSON document addressed by `(collection, id)`. [`DocumentStore`] is the
//! seam between the accessors and a backend:
//!
//! - [`PgDocumentStore`] - `PostgreSQL` `documents` table (JSONB)
//! - [`MemoryDocumentStore`] - process-local maps for tests and local runs
//!
//! Queries support equality, typed range and case-insensitive substring
//! filters, a single typed ordering field with the document id as
//! tie-breaker, and keyset continuation after a `(value, id)` position.
//! Documents missing the ordering field (or holding null) never appear in
//! ordered results. A present value that does not convert to the field's
//! kind fails the whole query with [`StoreError`] on every backend.

mod memory;
mod postgres;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Collection holding product documents.
pub const PRODUCTS: &str = "products";
/// Collection holding one wishlist document per user.
pub const WISHLISTS: &str = "wishlists";
/// Collection holding the singleton settings document.
pub const SETTINGS: &str = "settings";

/// Errors raised by a document store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document {collection}/{id} is malformed: {reason}")]
    Malformed {
        collection: String,
        id: String,
        reason: String,
    },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A stored document with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    /// Deserialize the document body, reporting which document was bad.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Malformed`] if the body does not match `T`.
    pub fn decode<T: serde::de::DeserializeOwned>(self, collection: &str) -> Result<T, StoreError> {
        serde_json::from_value(self.data).map_err(|e| StoreError::Malformed {
            collection: collection.to_string(),
            id: self.id,
            reason: e.to_string(),
        })
    }
}

/// How a field's JSON value is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Decimal number, stored as a JSON number or numeric string.
    Numeric,
    /// RFC 3339 timestamp string.
    Timestamp,
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Gte,
    Lte,
}

/// A predicate on a top-level document field.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals the given string.
    Eq { field: String, value: String },
    /// Typed comparison against a bound.
    Range {
        field: String,
        kind: FieldKind,
        bound: Bound,
        value: String,
    },
    /// Case-insensitive substring match.
    Contains { field: String, needle: String },
}

/// Ordering field of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub kind: FieldKind,
    pub direction: Direction,
}

/// A filtered, ordered, limited read of one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentQuery {
    pub filters: Vec<Filter>,
    pub order: OrderBy,
    /// Continue strictly after this `(order value, id)` position.
    pub start_after: Option<(Value, String)>,
    pub limit: usize,
}

/// Backend for JSON document persistence.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Create or replace a document.
    async fn set(&self, collection: &str, id: &str, data: &Value) -> Result<(), StoreError>;

    /// Shallow-merge `data` into a document, creating it if absent.
    async fn merge(&self, collection: &str, id: &str, data: &Value) -> Result<(), StoreError>;

    /// Delete a document. Returns whether it existed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// Run an ordered query.
    async fn query(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, StoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Render a JSON scalar as the text the backends compare against.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
