//! Checkout route handlers.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use kirana_core::to_minor_units;
use kirana_core::types::price::DEFAULT_CURRENCY;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ApiJson;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::payments::GatewayOrderRequest;
use crate::payments::signature::verify_payment_signature;
use crate::state::AppState;

/// Body of `POST /api/payment/create-order`. Amount is in major units.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub notes: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Create a gateway order for the requested charge.
///
/// Every call creates a new, billable order.
#[tracing::instrument(skip(state, body))]
pub async fn create_order(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>> {
    let amount = to_minor_units(body.amount)?;

    let request = GatewayOrderRequest {
        amount,
        currency: non_blank(body.currency).unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        receipt: non_blank(body.receipt)
            .unwrap_or_else(|| format!("receipt_{}", Utc::now().timestamp_millis())),
        notes: body.notes.unwrap_or_default(),
    };

    let gateway = state.gateway()?;
    let order = gateway.create_order(&request).await?;

    add_breadcrumb("checkout", "Gateway order created", &[("order_id", order.id.as_str())]);

    Ok(Json(CreateOrderResponse {
        id: order.id.into_inner(),
        amount: order.amount,
        currency: order.currency,
    }))
}

/// Body of `POST /api/payment/verify`, named by the gateway's callback.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,
    #[serde(default)]
    pub razorpay_signature: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn verify_failure(status: StatusCode, error: impl Into<String>) -> Response {
    let body = VerifyResponse {
        verified: false,
        error: Some(error.into()),
    };
    (status, Json(body)).into_response()
}

/// Verify the signature the checkout widget returned.
///
/// A pure function of the three fields and the gateway secret.
#[tracing::instrument(skip(state, body))]
pub async fn verify(
    State(state): State<AppState>,
    body: std::result::Result<Json<VerifyRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = body else {
        return verify_failure(StatusCode::BAD_REQUEST, "Invalid request body");
    };

    // Signed values are compared exactly as received; only absence is checked.
    let present = |v: Option<String>| v.filter(|s| !s.is_empty());
    let (Some(order_id), Some(payment_id), Some(signature)) = (
        present(body.razorpay_order_id),
        present(body.razorpay_payment_id),
        present(body.razorpay_signature),
    ) else {
        return verify_failure(
            StatusCode::BAD_REQUEST,
            "Missing razorpay_order_id, razorpay_payment_id or razorpay_signature",
        );
    };

    let Some(razorpay) = state.config().razorpay.as_ref() else {
        let err = AppError::Gateway(crate::payments::GatewayError::NotConfigured);
        err.report();
        return verify_failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
    };

    match verify_payment_signature(
        razorpay.key_secret.expose_secret(),
        &order_id,
        &payment_id,
        &signature,
    ) {
        Ok(true) => {
            tracing::info!(%order_id, %payment_id, "Payment verified");
            Json(VerifyResponse {
                verified: true,
                error: None,
            })
            .into_response()
        }
        Ok(false) => {
            tracing::warn!(%order_id, %payment_id, "Payment signature mismatch");
            verify_failure(StatusCode::BAD_REQUEST, "Invalid payment signature")
        }
        Err(e) => {
            let err = AppError::Internal(e.to_string());
            err.report();
            verify_failure(StatusCode::INTERNAL_SERVER_ERROR, "Payment verification failed")
        }
    }
}
