//! In-process document store.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{
    Bound, Direction, Document, DocumentQuery, DocumentStore, FieldKind, Filter, StoreError,
    scalar_text,
};

/// Document store backed by in-memory maps.
///
/// Matches the ordering and filtering semantics of [`super::PgDocumentStore`]
/// so router tests exercise the same behavior as production.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

/// A field value converted to its comparison type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Text(String),
    Numeric(Decimal),
    Timestamp(DateTime<Utc>),
    Integer(i64),
}

impl SortKey {
    fn from_value(value: &Value, kind: FieldKind) -> Option<Self> {
        match kind {
            FieldKind::Text => scalar_text(value).map(Self::Text),
            FieldKind::Numeric => {
                let text = scalar_text(value)?;
                Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .ok()
                    .map(Self::Numeric)
            }
            FieldKind::Timestamp => DateTime::parse_from_rfc3339(value.as_str()?)
                .ok()
                .map(|dt| Self::Timestamp(dt.with_timezone(&Utc))),
            FieldKind::Integer => match value {
                Value::Number(n) => n.as_i64().map(Self::Integer),
                Value::String(s) => s.parse().ok().map(Self::Integer),
                _ => None,
            },
        }
    }
}

/// Typed value of `field`, `None` when absent or null.
///
/// A value that does not convert is an error, as the `PostgreSQL` cast is.
fn typed_field(
    collection: &str,
    id: &str,
    data: &Value,
    field: &str,
    kind: FieldKind,
) -> Result<Option<SortKey>, StoreError> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => SortKey::from_value(value, kind)
            .map(Some)
            .ok_or_else(|| StoreError::Malformed {
                collection: collection.to_string(),
                id: id.to_string(),
                reason: format!("{field} is not a valid {kind:?} value"),
            }),
    }
}

fn matches(
    collection: &str,
    id: &str,
    data: &Value,
    filter: &Filter,
) -> Result<bool, StoreError> {
    match filter {
        Filter::Eq { field, value } => {
            Ok(data.get(field).and_then(scalar_text).as_deref() == Some(value.as_str()))
        }
        Filter::Range {
            field,
            kind,
            bound,
            value,
        } => {
            let limit = SortKey::from_value(&Value::String(value.clone()), *kind)
                .ok_or_else(|| StoreError::InvalidQuery(format!("bad bound for {field}")))?;
            let Some(actual) = typed_field(collection, id, data, field, *kind)? else {
                return Ok(false);
            };
            Ok(match bound {
                Bound::Gte => actual >= limit,
                Bound::Lte => actual <= limit,
            })
        }
        Filter::Contains { field, needle } => Ok(data
            .get(field)
            .and_then(scalar_text)
            .is_some_and(|s| s.to_lowercase().contains(&needle.to_lowercase()))),
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn set(&self, collection: &str, id: &str, data: &Value) -> Result<(), StoreError> {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data.clone());
        Ok(())
    }

    async fn merge(&self, collection: &str, id: &str, data: &Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        match (docs.get_mut(id), data) {
            (Some(Value::Object(existing)), Value::Object(patch)) => {
                for (key, value) in patch {
                    existing.insert(key.clone(), value.clone());
                }
            }
            _ => {
                docs.insert(id.to_string(), data.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        Ok(self
            .collections
            .write()
            .await
            .get_mut(collection)
            .is_some_and(|docs| docs.remove(id).is_some()))
    }

    async fn query(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, StoreError> {
        let order = &query.order;
        let start_after = match &query.start_after {
            Some((key, id)) => {
                let key = SortKey::from_value(key, order.kind).ok_or_else(|| {
                    StoreError::InvalidQuery(format!("cursor value does not match {}", order.field))
                })?;
                Some((key, id.clone()))
            }
            None => None,
        };

        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<(SortKey, &String, &Value)> = Vec::new();
        'docs: for (id, data) in docs {
            for filter in &query.filters {
                if !matches(collection, id, data, filter)? {
                    continue 'docs;
                }
            }
            if let Some(key) = typed_field(collection, id, data, &order.field, order.kind)? {
                rows.push((key, id, data));
            }
        }

        let compare = |a: (&SortKey, &String), b: (&SortKey, &String)| -> Ordering {
            let ordering = a.0.cmp(b.0).then_with(|| a.1.cmp(b.1));
            match order.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            }
        };

        rows.sort_by(|a, b| compare((&a.0, a.1), (&b.0, b.1)));

        Ok(rows
            .into_iter()
            .filter(|(key, id, _)| {
                start_after
                    .as_ref()
                    .is_none_or(|(after_key, after_id)| {
                        compare((key, *id), (after_key, after_id)) == Ordering::Greater
                    })
            })
            .take(query.limit)
            .map(|(_, id, data)| Document {
                id: id.clone(),
                data: data.clone(),
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
