//! Money amounts at the payment gateway boundary.
//!
//! Catalog prices are `rust_decimal::Decimal` values in major units. The
//! payment gateway only accepts integer minor units (paise for INR), and
//! the checkout client submits the charge as a JSON number. The conversion
//! multiplies in `f64` and rounds half away from zero, so `499.995` becomes
//! `50000` while `1.005` becomes `100` (its `f64` product is just below
//! `100.5`).

/// Default ISO 4217 currency for gateway orders.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Minor units per major unit for every supported currency.
const MINOR_UNITS_PER_MAJOR: f64 = 100.0;

/// Largest minor-unit amount accepted (keeps the value exact in `f64`).
const MAX_MINOR_UNITS: f64 = 9_007_199_254_740_991.0;

/// Errors converting a requested charge to minor units.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AmountError {
    /// No amount supplied.
    #[error("amount is required")]
    Missing,
    /// Zero, negative or non-finite amount.
    #[error("amount must be greater than 0")]
    NotPositive,
    /// The amount does not fit the gateway's integer representation.
    #[error("amount is too large")]
    TooLarge,
}

/// Convert a charge in major units to integer minor units.
///
/// # Errors
///
/// Returns [`AmountError::Missing`] for `None`, [`AmountError::NotPositive`]
/// for zero, negative, or non-finite values, and [`AmountError::TooLarge`]
/// when the result exceeds 2^53 - 1.
///
/// ```
/// use kirana_core::to_minor_units;
///
/// assert_eq!(to_minor_units(Some(499.995)), Ok(50_000));
/// assert_eq!(to_minor_units(Some(19.99)), Ok(1_999));
/// assert!(to_minor_units(Some(0.0)).is_err());
/// ```
pub fn to_minor_units(amount: Option<f64>) -> Result<i64, AmountError> {
    let amount = amount.ok_or(AmountError::Missing)?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AmountError::NotPositive);
    }

    let minor = (amount * MINOR_UNITS_PER_MAJOR).round();
    if minor > MAX_MINOR_UNITS {
        return Err(AmountError::TooLarge);
    }

    // Bounded above, so the cast is exact.
    #[allow(clippy::cast_possible_truncation)]
    Ok(minor as i64)
}
