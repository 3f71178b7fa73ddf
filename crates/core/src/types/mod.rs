//! Core types for Kirana.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod settings;
pub mod wishlist;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{AmountError, to_minor_units};
pub use product::{Product, ProductDraft, ProductValidationError};
pub use settings::{AppSettings, SettingsPatch, StoredTimestamp, format_timestamp};
pub use wishlist::{Toggle, Wishlist, WishlistItem};
