//! Global storefront settings.
//!
//! Settings live in the `settings/global` singleton document. Every stored
//! field is optional: a read starts from [`AppSettings::default`] and lays
//! the stored fields over it with [`AppSettings::merged_with`]. A write
//! sends only the fields the caller supplied, so untouched fields keep
//! whatever is stored (or keep falling back to the defaults).

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Effective storefront settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub store_name: String,
    pub tagline: String,
    pub logo_url: String,
    pub support_email: String,
    pub support_phone: String,
    pub address: String,
    pub currency: String,
    pub currency_symbol: String,
    pub free_shipping_threshold: Decimal,
    pub shipping_fee: Decimal,
    pub tax_rate_percent: Decimal,
    pub low_stock_threshold: u32,
    pub maintenance_mode: bool,
    pub announcement: String,
    pub instagram_url: String,
    pub facebook_url: String,
    pub twitter_url: String,
    /// RFC 3339 time of the last write, absent until the first write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            store_name: "Kirana".to_string(),
            tagline: "Everyday essentials, delivered".to_string(),
            logo_url: String::new(),
            support_email: "support@kirana.shop".to_string(),
            support_phone: "+91 80000 00000".to_string(),
            address: String::new(),
            currency: "INR".to_string(),
            currency_symbol: "₹".to_string(),
            free_shipping_threshold: Decimal::new(499, 0),
            shipping_fee: Decimal::new(49, 0),
            tax_rate_percent: Decimal::new(18, 0),
            low_stock_threshold: 5,
            maintenance_mode: false,
            announcement: String::new(),
            instagram_url: String::new(),
            facebook_url: String::new(),
            twitter_url: String::new(),
            updated_at: None,
        }
    }
}

/// Partial settings, as stored in the singleton document or as submitted
/// by an admin update. `None` means "not present".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_shipping_threshold: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_fee: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate_percent: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<StoredTimestamp>,
}

impl SettingsPatch {
    /// Whether the patch carries no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Timestamp representations found in stored documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredTimestamp {
    /// RFC 3339 text.
    Text(String),
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// The hosted store's native `{seconds, nanoseconds}` object.
    Parts {
        seconds: i64,
        #[serde(default, alias = "nanos")]
        nanoseconds: u32,
    },
}

impl StoredTimestamp {
    /// Render the timestamp as RFC 3339 UTC with millisecond precision.
    ///
    /// Text that is not valid RFC 3339 is passed through unchanged.
    #[must_use]
    pub fn normalize(&self) -> String {
        let parsed = match self {
            Self::Text(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Self::Millis(millis) => Utc.timestamp_millis_opt(*millis).single(),
            Self::Parts {
                seconds,
                nanoseconds,
            } => Utc.timestamp_opt(*seconds, *nanoseconds).single(),
        };

        match (parsed, self) {
            (Some(dt), _) => format_timestamp(dt),
            (None, Self::Text(text)) => text.clone(),
            (None, _) => String::new(),
        }
    }
}

/// Format a time the way settings timestamps are exposed.
#[must_use]
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl AppSettings {
    /// Lay the stored fields of `patch` over `self`; stored values win.
    ///
    /// Each field is taken independently; there are no cross-field rules.
    #[must_use]
    pub fn merged_with(self, patch: SettingsPatch) -> Self {
        Self {
            store_name: patch.store_name.unwrap_or(self.store_name),
            tagline: patch.tagline.unwrap_or(self.tagline),
            logo_url: patch.logo_url.unwrap_or(self.logo_url),
            support_email: patch.support_email.unwrap_or(self.support_email),
            support_phone: patch.support_phone.unwrap_or(self.support_phone),
            address: patch.address.unwrap_or(self.address),
            currency: patch.currency.unwrap_or(self.currency),
            currency_symbol: patch.currency_symbol.unwrap_or(self.currency_symbol),
            free_shipping_threshold: patch
                .free_shipping_threshold
                .unwrap_or(self.free_shipping_threshold),
            shipping_fee: patch.shipping_fee.unwrap_or(self.shipping_fee),
            tax_rate_percent: patch.tax_rate_percent.unwrap_or(self.tax_rate_percent),
            low_stock_threshold: patch.low_stock_threshold.unwrap_or(self.low_stock_threshold),
            maintenance_mode: patch.maintenance_mode.unwrap_or(self.maintenance_mode),
            announcement: patch.announcement.unwrap_or(self.announcement),
            instagram_url: patch.instagram_url.unwrap_or(self.instagram_url),
            facebook_url: patch.facebook_url.unwrap_or(self.facebook_url),
            twitter_url: patch.twitter_url.unwrap_or(self.twitter_url),
            updated_at: patch
                .updated_at
                .map(|ts| ts.normalize())
                .or(self.updated_at),
        }
    }
}
