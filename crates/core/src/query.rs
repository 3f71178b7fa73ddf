//! Product listing queries and cursor pagination.
//!
//! Pagination is forward-only. Each page carries a [`Cursor`] pointing at
//! its last product; the next request starts strictly after it. A page
//! shorter than the requested limit means the listing is exhausted. A page
//! that is exactly full may still be the last one, in which case the
//! following request returns an empty page.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Product;

/// Default number of products per page.
pub const DEFAULT_PAGE_LIMIT: usize = 12;

/// Largest page a client may request.
pub const MAX_PAGE_LIMIT: usize = 100;

/// Listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    /// Most recently created first.
    #[default]
    Newest,
    PriceLowToHigh,
    PriceHighToLow,
    /// Highest popularity first.
    Popular,
}

/// Filter criteria for a product listing.
///
/// Changing any of these starts a new listing from the first page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub sort_by: SortBy,
    /// Case-insensitive substring of the product name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
}

impl ProductFilters {
    /// Drop blank category and search strings so they do not filter.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.category = self
            .category
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty() && c != "all");
        self.search_query = self
            .search_query
            .map(|q| q.trim().to_owned())
            .filter(|q| !q.is_empty());
        self
    }
}

/// One page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub filters: ProductFilters,
    pub page_limit: usize,
    pub cursor: Option<Cursor>,
}

impl ProductQuery {
    /// First page of a listing.
    #[must_use]
    pub const fn first_page(filters: ProductFilters, page_limit: usize) -> Self {
        Self {
            filters,
            page_limit,
            cursor: None,
        }
    }
}

/// Errors decoding a client-supplied cursor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    #[error("cursor is not valid base64")]
    Encoding,
    #[error("cursor payload is malformed")]
    Payload,
}

/// Position of the last document of a page: its order-by field value and
/// its id (the tie-breaker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    #[serde(rename = "k")]
    pub key: serde_json::Value,
    pub id: String,
}

impl Cursor {
    /// Encode as an opaque URL-safe token.
    #[must_use]
    pub fn encode(&self) -> String {
        // Serializing a Value and a String cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a token produced by [`Cursor::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`CursorError`] if the token is not base64 or not a cursor.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| CursorError::Encoding)?;
        serde_json::from_slice(&bytes).map_err(|_| CursorError::Payload)
    }
}

/// One page of products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub products: Vec<Product>,
    /// Cursor at the last product, `None` for an empty page.
    pub next_cursor: Option<Cursor>,
    /// `true` when the page was full, so another page may exist.
    pub has_more: bool,
}

impl Page {
    /// Build a page, applying the short-page exhaustion rule.
    #[must_use]
    pub fn new(products: Vec<Product>, next_cursor: Option<Cursor>, page_limit: usize) -> Self {
        let has_more = page_limit > 0 && products.len() >= page_limit;
        Self {
            products,
            next_cursor,
            has_more,
        }
    }

    /// An empty, exhausted page.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            products: Vec::new(),
            next_cursor: None,
            has_more: false,
        }
    }
}

impl Serialize for Page {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Page", 3)?;
        state.serialize_field("products", &self.products)?;
        state.serialize_field("nextCursor", &self.next_cursor.as_ref().map(Cursor::encode))?;
        state.serialize_field("hasMore", &self.has_more)?;
        state.end()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_sort_by_wire_names() {
        let sorts: Vec<SortBy> =
            serde_json::from_str(r#"["newest","priceLowToHigh","priceHighToLow","popular"]"#)
                .unwrap();
        assert_eq!(
            sorts,
            vec![
                SortBy::Newest,
                SortBy::PriceLowToHigh,
                SortBy::PriceHighToLow,
                SortBy::Popular
            ]
        );
    }

    #[test]
    fn test_cursor_token_round_trip() {
        let cursor = Cursor {
            key: json!("2026-01-01T00:00:00Z"),
            id: "p-9".to_string(),
        };
        let token = cursor.encode();
        assert!(!token.contains('='));
        assert_eq!(Cursor::decode(&token).unwrap(), cursor);
    }

    #[test]
    fn test_cursor_rejects_garbage() {
        assert_eq!(Cursor::decode("***"), Err(CursorError::Encoding));
        let not_a_cursor = URL_SAFE_NO_PAD.encode(b"[1,2,3]");
        assert_eq!(Cursor::decode(&not_a_cursor), Err(CursorError::Payload));
    }

    #[test]
    fn test_short_page_is_exhausted() {
        assert!(!Page::new(Vec::new(), None, 10).has_more);
    }

    #[test]
    fn test_normalized_filters_drop_blanks() {
        let filters = ProductFilters {
            category: Some("all".to_string()),
            search_query: Some("   ".to_string()),
            ..ProductFilters::default()
        }
        .normalized();
        assert!(filters.category.is_none());
        assert!(filters.search_query.is_none());
    }

    #[test]
    fn test_empty_page_serializes_null_cursor() {
        let json = serde_json::to_value(Page::empty()).unwrap();
        assert_eq!(json, json!({"products": [], "nextCursor": null, "hasMore": false}));
    }
}
