//! Repositories over the document store.
//!
//! # Collections
//!
//! - `products/{id}` - catalog records, written by admin routes and the CLI
//! - `wishlists/{uid}` - one document per user holding `items[]`
//! - `settings/global` - singleton store settings, merged over defaults
//!
//! Repositories borrow a [`DocumentStore`](crate::store::DocumentStore) and
//! convert between documents and the domain types in `kirana-core`.

pub mod products;
pub mod settings;
pub mod wishlists;

pub use products::ProductRepository;
pub use settings::SettingsRepository;
pub use wishlists::WishlistRepository;
