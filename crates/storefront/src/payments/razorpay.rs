//! Razorpay Orders API client.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use super::{GatewayError, GatewayOrder, GatewayOrderRequest, PaymentGateway};
use crate::config::RazorpayConfig;

/// Error body returned by the Razorpay API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Razorpay API client authenticated with basic auth.
#[derive(Clone)]
pub struct RazorpayClient {
    client: reqwest::Client,
    key_id: String,
    key_secret: SecretString,
    api_base: String,
}

impl RazorpayClient {
    /// Create a client from configured credentials.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &RazorpayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("kirana-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            api_base: config.api_base.clone(),
        })
    }
}

/// Pick the most useful message out of an error response.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            error: ApiErrorDetail {
                description: Some(description),
                ..
            },
        }) => description,
        Ok(ApiErrorBody {
            error: ApiErrorDetail {
                code: Some(code), ..
            },
        }) => code,
        _ if body.trim().is_empty() => format!("Payment gateway returned {status}"),
        _ => body.trim().to_string(),
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    #[instrument(
        skip(self, request),
        fields(amount = request.amount, currency = %request.currency)
    )]
    async fn create_order(
        &self,
        request: &GatewayOrderRequest,
    ) -> Result<GatewayOrder, GatewayError> {
        let url = format!("{}/orders", self.api_base);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(request)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            tracing::warn!(status = status.as_u16(), %message, "Gateway rejected order");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let order: GatewayOrder = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        tracing::info!(order_id = %order.id, "Gateway order created");
        Ok(order)
    }
}
