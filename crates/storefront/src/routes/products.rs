//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use kirana_core::query::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use kirana_core::{Cursor, Page, Product, ProductFilters, ProductId, ProductQuery, SortBy};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query parameters of `GET /api/products`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub category: Option<String>,
    pub sort_by: Option<SortBy>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

impl ListParams {
    /// Validate the parameters and build the page request.
    fn into_query(self) -> Result<ProductQuery> {
        let page_limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if !(1..=MAX_PAGE_LIMIT).contains(&page_limit) {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }

        let cursor = self
            .cursor
            .filter(|c| !c.trim().is_empty())
            .map(|c| Cursor::decode(&c))
            .transpose()?;

        let filters = ProductFilters {
            category: self.category,
            sort_by: self.sort_by.unwrap_or_default(),
            search_query: self.search,
            min_price: self.min_price,
            max_price: self.max_price,
        }
        .normalized();

        Ok(ProductQuery {
            filters,
            page_limit,
            cursor,
        })
    }
}

/// List one page of products.
#[tracing::instrument(skip(state, params))]
pub async fn index(
    State(state): State<AppState>,
    params: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Page>> {
    let Query(params) = params.map_err(|e| AppError::Validation(e.body_text()))?;
    let query = params.into_query()?;
    let page = ProductRepository::new(state.store()).list(&query).await?;
    Ok(Json(page))
}

/// Show one product.
#[tracing::instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    ProductRepository::new(state.store())
        .get(&ProductId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}
