//! Wishlist repository.
//!
//! Toggling reads the whole document, edits the item array and writes the
//! whole document back. Two sessions toggling at the same time can lose one
//! of the changes; the last write wins.

use chrono::{DateTime, Utc};
use kirana_core::{ProductId, Toggle, UserId, Wishlist, WishlistItem};
use tracing::instrument;

use super::ProductRepository;
use crate::store::{Document, DocumentStore, StoreError, WISHLISTS};

/// Repository for per-user wishlists.
pub struct WishlistRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Get a user's wishlist, empty if none was ever written.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails or the document is malformed.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get(&self, user_id: &UserId) -> Result<Wishlist, StoreError> {
        match self.store.get(WISHLISTS, user_id.as_str()).await? {
            Some(data) => Document {
                id: user_id.to_string(),
                data,
            }
            .decode(WISHLISTS),
            None => Ok(Wishlist::default()),
        }
    }

    /// Add or remove a product.
    ///
    /// Adding snapshots the live product's name, price and first image.
    /// Returns `None` when adding a product that does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if a read or the write fails.
    #[instrument(skip(self, now), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn toggle(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        now: DateTime<Utc>,
    ) -> Result<Option<(Toggle, Wishlist)>, StoreError> {
        let mut wishlist = self.get(user_id).await?;

        let outcome = if wishlist.remove(product_id) {
            Toggle::Removed
        } else {
            let Some(product) = ProductRepository::new(self.store).get(product_id).await? else {
                return Ok(None);
            };
            wishlist.toggle(product_id, || WishlistItem::snapshot(&product, now))
        };

        let data = serde_json::to_value(&wishlist)?;
        self.store.set(WISHLISTS, user_id.as_str(), &data).await?;

        tracing::debug!(?outcome, items = wishlist.items.len(), "Wishlist toggled");
        Ok(Some((outcome, wishlist)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use chrono::TimeZone;
    use kirana_core::Product;
    use rust_decimal::Decimal;

    use super::*;
    use crate::store::MemoryDocumentStore;

    async fn store_with_product() -> MemoryDocumentStore {
        let store = MemoryDocumentStore::new();
        let product = Product {
            id: ProductId::new("ghee-500"),
            name: "Cow Ghee 500ml".to_string(),
            description: String::new(),
            price: Decimal::from_str("349.00").unwrap(),
            images: vec!["https://cdn.kirana.shop/ghee.jpg".to_string()],
            category: "dairy".to_string(),
            popularity: 10,
            stock: 4,
            created_at: Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap(),
        };
        ProductRepository::new(&store).put(&product).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_missing_document_is_empty() {
        let store = MemoryDocumentStore::new();
        let wishlist = WishlistRepository::new(&store)
            .get(&UserId::new("u1"))
            .await
            .unwrap();
        assert!(wishlist.items.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_list() {
        let store = store_with_product().await;
        let repo = WishlistRepository::new(&store);
        let user = UserId::new("u1");
        let product = ProductId::new("ghee-500");
        let before = repo.get(&user).await.unwrap();

        let (added, wishlist) = repo.toggle(&user, &product, Utc::now()).await.unwrap().unwrap();
        assert_eq!(added, Toggle::Added);
        assert_eq!(wishlist.items[0].name, "Cow Ghee 500ml");
        assert_eq!(
            wishlist.items[0].image.as_deref(),
            Some("https://cdn.kirana.shop/ghee.jpg")
        );

        let (removed, wishlist) = repo.toggle(&user, &product, Utc::now()).await.unwrap().unwrap();
        assert_eq!(removed, Toggle::Removed);
        assert_eq!(wishlist, before);
    }

    #[tokio::test]
    async fn test_snapshot_is_not_refreshed() {
        let store = store_with_product().await;
        let repo = WishlistRepository::new(&store);
        let user = UserId::new("u1");
        let product_id = ProductId::new("ghee-500");
        repo.toggle(&user, &product_id, Utc::now()).await.unwrap();

        let products = ProductRepository::new(&store);
        let mut product = products.get(&product_id).await.unwrap().unwrap();
        product.price = Decimal::from_str("399.00").unwrap();
        products.put(&product).await.unwrap();

        let wishlist = repo.get(&user).await.unwrap();
        assert_eq!(wishlist.items[0].price, Decimal::from_str("349.00").unwrap());
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_added() {
        let store = store_with_product().await;
        let repo = WishlistRepository::new(&store);
        let outcome = repo
            .toggle(&UserId::new("u1"), &ProductId::new("missing"), Utc::now())
            .await
            .unwrap();
        assert!(outcome.is_none());
        assert_eq!(store.len(WISHLISTS).await, 0);
    }
}
