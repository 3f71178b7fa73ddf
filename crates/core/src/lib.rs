//! Kirana Core - Shared domain types.
//!
//! This crate provides the types used across all Kirana components:
//! - `storefront` - HTTP API for the catalog, wishlist, settings, checkout and mail relay
//! - `cli` - Command-line tools for migrations, catalog seeding and settings
//!
//! # Architecture
//!
//! The core crate contains only types and pure state machines - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and lets the
//! browser-facing pagination logic be tested without a running store.
//!
//! # Modules
//!
//! - [`types`] - Ids, email addresses, prices, products, wishlists and settings
//! - [`query`] - Product filters, sort orders, cursors and pages
//! - [`feed`] - "Load more" state machine with stale-response discarding

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod feed;
pub mod query;
pub mod types;

pub use feed::{Applied, FetchTicket, ProductFeed};
pub use query::{Cursor, CursorError, Page, ProductFilters, ProductQuery, SortBy};
pub use types::*;
