//! `PostgreSQL` document store.
//!
//! # Table: `documents`
//!
//! | column       | type          |
//! |--------------|---------------|
//! | `collection` | `TEXT`        |
//! | `id`         | `TEXT`        |
//! | `data`       | `JSONB`       |
//! | `created_at` | `TIMESTAMPTZ` |
//! | `updated_at` | `TIMESTAMPTZ` |
//!
//! Migrations live in `crates/storefront/migrations/` and run via
//! `kirana-cli migrate` or [`PgDocumentStore::migrate`].

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use super::{
    Bound, Direction, Document, DocumentQuery, DocumentStore, FieldKind, Filter, StoreError,
    scalar_text,
};

/// Document store on a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Connect with sensible pool defaults.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the connection cannot be established.
    pub async fn connect(database_url: &SecretString) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url.expose_secret())
            .await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending migrations.
    ///
    /// # Errors
    ///
    /// Returns `MigrateError` if a migration fails or history diverges.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// Push the typed expression for a top-level field.
fn push_field(qb: &mut QueryBuilder<'_, Postgres>, field: &str, kind: FieldKind) {
    qb.push("(data ->> ");
    qb.push_bind(field.to_string());
    qb.push(")");
    push_cast(qb, kind);
}

/// Push a bound scalar cast to the field's comparison type.
fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: String, kind: FieldKind) {
    qb.push_bind(value);
    push_cast(qb, kind);
}

fn push_cast(qb: &mut QueryBuilder<'_, Postgres>, kind: FieldKind) {
    qb.push(match kind {
        FieldKind::Text => " COLLATE \"C\"",
        FieldKind::Numeric => "::numeric",
        FieldKind::Timestamp => "::timestamptz",
        FieldKind::Integer => "::bigint",
    });
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    match filter {
        Filter::Eq { field, value } => {
            qb.push("data ->> ");
            qb.push_bind(field.clone());
            qb.push(" = ");
            qb.push_bind(value.clone());
        }
        Filter::Range {
            field,
            kind,
            bound,
            value,
        } => {
            push_field(qb, field, *kind);
            qb.push(match bound {
                Bound::Gte => " >= ",
                Bound::Lte => " <= ",
            });
            push_value(qb, value.clone(), *kind);
        }
        Filter::Contains { field, needle } => {
            qb.push("strpos(lower(data ->> ");
            qb.push_bind(field.clone());
            qb.push("), lower(");
            qb.push_bind(needle.clone());
            qb.push(")) > 0");
        }
    }
}

/// Build the `SELECT` for a [`DocumentQuery`].
fn build_query<'a>(
    collection: &str,
    query: &DocumentQuery,
) -> Result<QueryBuilder<'a, Postgres>, StoreError> {
    let order = &query.order;
    let limit = i64::try_from(query.limit)
        .map_err(|_| StoreError::InvalidQuery(format!("limit {} out of range", query.limit)))?;

    let mut qb = QueryBuilder::new("SELECT id, data FROM documents WHERE collection = ");
    qb.push_bind(collection.to_string());

    for filter in &query.filters {
        qb.push(" AND ");
        push_filter(&mut qb, filter);
    }

    qb.push(" AND data ->> ");
    qb.push_bind(order.field.clone());
    qb.push(" IS NOT NULL");

    if let Some((key, id)) = &query.start_after {
        let key = scalar_text(key).ok_or_else(|| {
            StoreError::InvalidQuery(format!("cursor value does not match {}", order.field))
        })?;
        qb.push(" AND (");
        push_field(&mut qb, &order.field, order.kind);
        qb.push(", id COLLATE \"C\") ");
        qb.push(match order.direction {
            Direction::Asc => ">",
            Direction::Desc => "<",
        });
        qb.push(" (");
        push_value(&mut qb, key, order.kind);
        qb.push(", ");
        qb.push_bind(id.clone());
        qb.push(")");
    }

    let direction = match order.direction {
        Direction::Asc => " ASC",
        Direction::Desc => " DESC",
    };
    qb.push(" ORDER BY ");
    push_field(&mut qb, &order.field, order.kind);
    qb.push(direction);
    qb.push(", id COLLATE \"C\"");
    qb.push(direction);
    qb.push(" LIMIT ");
    qb.push_bind(limit);

    Ok(qb)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[instrument(skip(self))]
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let row: Option<Json<Value>> =
            sqlx::query_scalar("SELECT data FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(data)| data))
    }

    #[instrument(skip(self, data))]
    async fn set(&self, collection: &str, id: &str, data: &Value) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            ",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(data))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self, data))]
    async fn merge(&self, collection: &str, id: &str, data: &Value) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = documents.data || EXCLUDED.data, updated_at = now()
            ",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(data))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, query), fields(order = %query.order.field, limit = query.limit))]
    async fn query(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, StoreError> {
        let mut qb = build_query(collection, query)?;
        let rows: Vec<(String, Json<Value>)> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|(id, Json(data))| Document { id, data })
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
