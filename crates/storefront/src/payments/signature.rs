//! Payment signature verification.
//!
//! The gateway signs `"{order_id}|{payment_id}"` with HMAC-SHA256 keyed by
//! the API secret and hands the lowercase hex digest to the client, which
//! forwards it for verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("Invalid signing key: {0}")]
    InvalidKey(#[from] hmac::digest::InvalidLength),
}

/// Compute the expected signature for a payment.
///
/// # Errors
///
/// Returns [`SignatureError::InvalidKey`] if the key is rejected by HMAC.
pub fn payment_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
) -> Result<String, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check a client-supplied signature.
///
/// The outcome is exactly string equality with the expected digest; the
/// comparison itself does not short-circuit on the first differing byte.
///
/// # Errors
///
/// Returns [`SignatureError`] if the expected signature cannot be computed.
pub fn verify_payment_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> Result<bool, SignatureError> {
    let expected = payment_signature(secret, order_id, payment_id)?;
    Ok(constant_time_compare(&expected, signature))
}

/// Constant-time string comparison to prevent timing attacks.
pub(crate) fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
