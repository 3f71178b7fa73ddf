//! Catalog product records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Maximum number of image URLs stored per product.
pub const MAX_IMAGES: usize = 10;

/// A product document from the `products` collection.
///
/// Field names are camelCase on the wire and in the store; prices are
/// decimal strings in major units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    /// Ordered image URLs; the first one is the listing thumbnail.
    #[serde(default)]
    pub images: Vec<String>,
    pub category: String,
    /// Sort key for the "popular" ordering.
    #[serde(default)]
    pub popularity: i64,
    #[serde(default)]
    pub stock: u32,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// First image URL, used for thumbnails and wishlist snapshots.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Validation failures for admin-submitted product data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductValidationError {
    #[error("name is required")]
    MissingName,
    #[error("category is required")]
    MissingCategory,
    #[error("price cannot be negative")]
    NegativePrice,
    #[error("at most {max} images are allowed")]
    TooManyImages { max: usize },
}

/// Product fields supplied by the admin create/update endpoints.
///
/// The id and creation time are owned by the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub popularity: Option<i64>,
    #[serde(default)]
    pub stock: u32,
}

impl ProductDraft {
    /// Check the draft and normalize surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns the first rule the draft violates.
    pub fn validate(mut self) -> Result<Self, ProductValidationError> {
        self.name = self.name.trim().to_owned();
        self.category = self.category.trim().to_owned();
        self.images.retain(|url| !url.trim().is_empty());

        if self.name.is_empty() {
            return Err(ProductValidationError::MissingName);
        }
        if self.category.is_empty() {
            return Err(ProductValidationError::MissingCategory);
        }
        if self.price < Decimal::ZERO {
            return Err(ProductValidationError::NegativePrice);
        }
        if self.images.len() > MAX_IMAGES {
            return Err(ProductValidationError::TooManyImages { max: MAX_IMAGES });
        }
        Ok(self)
    }

    /// Build a new product with the given id and creation time.
    #[must_use]
    pub fn into_product(self, id: ProductId, created_at: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            images: self.images,
            category: self.category,
            popularity: self.popularity.unwrap_or(0),
            stock: self.stock,
            created_at,
        }
    }

    /// Replace an existing product's editable fields, keeping its id and
    /// creation time. Popularity is kept unless the draft sets it.
    #[must_use]
    pub fn apply_to(self, existing: Product) -> Product {
        let popularity = self.popularity.unwrap_or(existing.popularity);
        Product {
            popularity,
            ..self.into_product(existing.id, existing.created_at)
        }
    }
}
