//! Per-user wishlists.
//!
//! A wishlist is one document per user holding an array of snapshot items.
//! Snapshots copy the product's name, price and first image at the time the
//! item is added and are never refreshed afterwards, so they can drift from
//! later catalog edits.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::Product;

/// A product snapshot stored in a wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl WishlistItem {
    /// Snapshot a live product.
    #[must_use]
    pub fn snapshot(product: &Product, added_at: DateTime<Utc>) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.primary_image().map(str::to_owned),
            added_at,
        }
    }
}

/// Outcome of [`Wishlist::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

/// The `wishlists/{uid}` document body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wishlist {
    #[serde(default)]
    pub items: Vec<WishlistItem>,
}

impl Wishlist {
    /// Whether the product is already on the list.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.product_id == product_id)
    }

    /// Drop every entry for the product. Returns whether any was present.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.product_id != product_id);
        self.items.len() != before
    }

    /// Remove the product if present, otherwise append a snapshot built by
    /// `snapshot`. The closure only runs when an item is added.
    ///
    /// Keeps at most one entry per product id: removal drops every entry
    /// for the id, which also repairs documents written by older clients.
    pub fn toggle<F>(&mut self, product_id: &ProductId, snapshot: F) -> Toggle
    where
        F: FnOnce() -> WishlistItem,
    {
        if self.remove(product_id) {
            Toggle::Removed
        } else {
            self.items.push(snapshot());
            Toggle::Added
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn product(id: &str, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Decimal::from_str(price).unwrap(),
            images: vec![
                format!("https://cdn.example.com/{id}-1.jpg"),
                format!("https://cdn.example.com/{id}-2.jpg"),
            ],
            category: "snacks".to_string(),
            popularity: 0,
            stock: 3,
            created_at: DateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_snapshot_takes_first_image() {
        let item = WishlistItem::snapshot(&product("a", "10.00"), DateTime::UNIX_EPOCH);
        assert_eq!(item.image.as_deref(), Some("https://cdn.example.com/a-1.jpg"));
        assert_eq!(item.name, "Product a");
    }

    #[test]
    fn test_toggle_twice_restores_original() {
        let a = product("a", "10.00");
        let b = product("b", "20.00");
        let mut list = Wishlist::default();
        list.toggle(&a.id, || WishlistItem::snapshot(&a, DateTime::UNIX_EPOCH));
        let original = list.clone();

        assert_eq!(
            list.toggle(&b.id, || WishlistItem::snapshot(&b, DateTime::UNIX_EPOCH)),
            Toggle::Added
        );
        assert_eq!(
            list.toggle(&b.id, || WishlistItem::snapshot(&b, DateTime::UNIX_EPOCH)),
            Toggle::Removed
        );
        assert_eq!(list, original);
    }

    #[test]
    fn test_removal_does_not_build_snapshot() {
        let a = product("a", "10.00");
        let mut list = Wishlist {
            items: vec![WishlistItem::snapshot(&a, DateTime::UNIX_EPOCH)],
        };
        let outcome = list.toggle(&a.id, || panic!("snapshot built on removal"));
        assert_eq!(outcome, Toggle::Removed);
        assert!(list.items.is_empty());
    }

    #[test]
    fn test_removal_drops_duplicates() {
        let a = product("a", "10.00");
        let item = WishlistItem::snapshot(&a, DateTime::UNIX_EPOCH);
        let mut list = Wishlist {
            items: vec![item.clone(), item],
        };
        list.toggle(&a.id, || unreachable!());
        assert!(!list.contains(&a.id));
    }

    #[test]
    fn test_snapshot_is_not_refreshed() {
        let mut a = product("a", "10.00");
        let mut list = Wishlist::default();
        list.toggle(&a.id, || WishlistItem::snapshot(&a, DateTime::UNIX_EPOCH));

        a.price = Decimal::from_str("99.00").unwrap();
        assert_eq!(list.items[0].price, Decimal::from_str("10.00").unwrap());
    }

    #[test]
    fn test_missing_items_field_is_empty() {
        let list: Wishlist = serde_json::from_str("{}").unwrap();
        assert!(list.items.is_empty());
    }
}
