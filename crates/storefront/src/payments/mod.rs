//! Payment gateway integration.
//!
//! Checkout is a two step flow driven by the client:
//!
//! 1. `create-order` converts the charge to minor units and creates a
//!    gateway order through a [`PaymentGateway`].
//! 2. After the hosted checkout widget completes, `verify` recomputes the
//!    payment signature with [`signature::verify_payment_signature`].
//!
//! Nothing is persisted locally; the gateway owns the order ledger.

mod razorpay;
pub mod signature;

use std::collections::BTreeMap;

use async_trait::async_trait;
use kirana_core::GatewayOrderId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use razorpay::RazorpayClient;

/// Errors from the payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Credentials are not configured.
    #[error("Payment gateway is not configured")]
    NotConfigured,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway rejected the request.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Gateway answered with an unexpected body.
    #[error("Unexpected gateway response: {0}")]
    Parse(String),
}

/// Order creation request, amounts in minor units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayOrderRequest {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub notes: BTreeMap<String, Value>,
}

/// An order created on the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: GatewayOrderId,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: String,
}

/// A payment processor able to create orders.
///
/// Implementations hold no per-call state so one instance is shared by all
/// requests.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a billable order. Not idempotent.
    async fn create_order(&self, request: &GatewayOrderRequest)
    -> Result<GatewayOrder, GatewayError>;
}
