//! Product catalog repository.

use chrono::{DateTime, Utc};
use kirana_core::query::MAX_PAGE_LIMIT;
use kirana_core::{
    Cursor, Page, Product, ProductDraft, ProductFilters, ProductId, ProductQuery, SortBy,
};
use serde_json::Value;
use tracing::instrument;

use crate::store::{
    Bound, Direction, Document, DocumentQuery, DocumentStore, FieldKind, Filter, OrderBy,
    PRODUCTS, StoreError,
};

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    store: &'a dyn DocumentStore,
}

/// Ordering field for a listing sort.
fn order_for(sort_by: SortBy) -> OrderBy {
    let (field, kind, direction) = match sort_by {
        SortBy::Newest => ("createdAt", FieldKind::Timestamp, Direction::Desc),
        SortBy::PriceLowToHigh => ("price", FieldKind::Numeric, Direction::Asc),
        SortBy::PriceHighToLow => ("price", FieldKind::Numeric, Direction::Desc),
        SortBy::Popular => ("popularity", FieldKind::Integer, Direction::Desc),
    };
    OrderBy {
        field: field.to_string(),
        kind,
        direction,
    }
}

/// Store predicates for the listing filters.
fn filters_for(filters: &ProductFilters) -> Vec<Filter> {
    let mut out = Vec::new();
    if let Some(category) = &filters.category {
        out.push(Filter::Eq {
            field: "category".to_string(),
            value: category.clone(),
        });
    }
    if let Some(min) = filters.min_price {
        out.push(Filter::Range {
            field: "price".to_string(),
            kind: FieldKind::Numeric,
            bound: Bound::Gte,
            value: min.to_string(),
        });
    }
    if let Some(max) = filters.max_price {
        out.push(Filter::Range {
            field: "price".to_string(),
            kind: FieldKind::Numeric,
            bound: Bound::Lte,
            value: max.to_string(),
        });
    }
    if let Some(search) = &filters.search_query {
        out.push(Filter::Contains {
            field: "name".to_string(),
            needle: search.clone(),
        });
    }
    out
}

/// Build the store query for one listing page.
pub(crate) fn document_query(query: &ProductQuery) -> DocumentQuery {
    let filters = query.filters.clone().normalized();
    DocumentQuery {
        filters: filters_for(&filters),
        order: order_for(filters.sort_by),
        start_after: query.cursor.as_ref().map(|c| (c.key.clone(), c.id.clone())),
        limit: query.page_limit.clamp(1, MAX_PAGE_LIMIT),
    }
}

/// Decode a product document, filling in the id from the document key
/// when the body does not carry one.
fn decode_product(mut doc: Document) -> Result<Product, StoreError> {
    if let Value::Object(map) = &mut doc.data {
        map.entry("id")
            .or_insert_with(|| Value::String(doc.id.clone()));
    }
    doc.decode(PRODUCTS)
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails or the document is malformed.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let Some(data) = self.store.get(PRODUCTS, id.as_str()).await? else {
            return Ok(None);
        };
        decode_product(Document {
            id: id.to_string(),
            data,
        })
        .map(Some)
    }

    /// Fetch one page of a filtered, sorted listing.
    ///
    /// The cursor of the returned page points at its last product. A page
    /// shorter than the limit reports `has_more = false`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a document is malformed.
    #[instrument(
        skip(self, query),
        fields(sort = ?query.filters.sort_by, limit = query.page_limit)
    )]
    pub async fn list(&self, query: &ProductQuery) -> Result<Page, StoreError> {
        let doc_query = document_query(query);
        let docs = self.store.query(PRODUCTS, &doc_query).await?;

        let next_cursor = docs.last().and_then(|doc| {
            doc.data.get(&doc_query.order.field).map(|key| Cursor {
                key: key.clone(),
                id: doc.id.clone(),
            })
        });

        let products = docs
            .into_iter()
            .map(decode_product)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(products, next_cursor, doc_query.limit))
    }

    /// Create a product from a validated draft with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(
        &self,
        draft: ProductDraft,
        now: DateTime<Utc>,
    ) -> Result<Product, StoreError> {
        let id = ProductId::new(uuid::Uuid::new_v4().to_string());
        let product = draft.into_product(id, now);
        self.put(&product).await?;
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Replace a product's fields, keeping its id and creation time.
    ///
    /// Returns `None` if the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read or write fails.
    #[instrument(skip(self, draft), fields(product_id = %id))]
    pub async fn update(
        &self,
        id: &ProductId,
        draft: ProductDraft,
    ) -> Result<Option<Product>, StoreError> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };
        let product = draft.apply_to(existing);
        self.put(&product).await?;
        Ok(Some(product))
    }

    /// Delete a product. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the delete fails.
    pub async fn delete(&self, id: &ProductId) -> Result<bool, StoreError> {
        self.store.delete(PRODUCTS, id.as_str()).await
    }

    /// Create or overwrite a product document as-is.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    pub async fn put(&self, product: &Product) -> Result<(), StoreError> {
        let data = serde_json::to_value(product)?;
        self.store.set(PRODUCTS, product.id.as_str(), &data).await
    }
}
