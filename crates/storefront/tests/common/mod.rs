//! Shared fixtures for router tests: in-memory store, fake gateway and
//! fake mailer, plus request helpers.

#![allow(dead_code, clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use kirana_core::{Email, GatewayOrderId};
use kirana_storefront::config::{RazorpayConfig, StoreBackend, StorefrontConfig};
use kirana_storefront::payments::{GatewayError, GatewayOrder, GatewayOrderRequest, PaymentGateway};
use kirana_storefront::services::{EmailError, Mailer};
use kirana_storefront::state::AppState;
use kirana_storefront::store::MemoryDocumentStore;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "kZ8#pQ2$wL5^rT9&vB3*nM7!xC4@hJ6%";
pub const GATEWAY_SECRET: &str = "Gq7Lm2Xv9Rt4Kp8Wz3";

/// Configuration with rate limiting off and no external services.
pub fn test_config(with_gateway_secret: bool) -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        store: StoreBackend::Memory,
        allowed_origins: vec!["http://localhost:5173".to_string()],
        rate_limit: false,
        admin_api_token: SecretString::from(ADMIN_TOKEN),
        razorpay: with_gateway_secret.then(|| RazorpayConfig {
            key_id: "rzp_test_kirana".to_string(),
            key_secret: SecretString::from(GATEWAY_SECRET),
            api_base: "http://127.0.0.1:9".to_string(),
        }),
        email: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Gateway that records requests and answers from memory.
#[derive(Default)]
pub struct FakeGateway {
    pub requests: Mutex<Vec<GatewayOrderRequest>>,
    pub fail_with: Option<String>,
}

impl FakeGateway {
    pub fn failing(message: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<GatewayOrderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(
        &self,
        request: &GatewayOrderRequest,
    ) -> Result<GatewayOrder, GatewayError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        if let Some(message) = &self.fail_with {
            return Err(GatewayError::Api {
                status: 400,
                message: message.clone(),
            });
        }
        Ok(GatewayOrder {
            id: GatewayOrderId::new(format!("order_fake{}", requests.len())),
            amount: request.amount,
            currency: request.currency.clone(),
            receipt: Some(request.receipt.clone()),
            status: "created".to_string(),
        })
    }
}

/// Mailer that records messages.
#[derive(Default)]
pub struct FakeMailer {
    pub sent: Mutex<Vec<(String, String, String)>>,
    pub fail: bool,
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send_html(&self, to: &Email, subject: &str, html: &str) -> Result<(), EmailError> {
        if self.fail {
            return Err(EmailError::InvalidAddress("relay refused recipient".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), html.to_string()));
        Ok(())
    }
}

/// Everything a router test needs.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryDocumentStore>,
    pub gateway: Arc<FakeGateway>,
    pub mailer: Arc<FakeMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(FakeGateway::default(), FakeMailer::default())
    }

    pub fn with(gateway: FakeGateway, mailer: FakeMailer) -> Self {
        let store = Arc::new(MemoryDocumentStore::new());
        let gateway = Arc::new(gateway);
        let mailer = Arc::new(mailer);
        let state = AppState::builder(test_config(true), store.clone())
            .gateway(gateway.clone())
            .mailer(mailer.clone())
            .build();
        Self {
            router: kirana_storefront::app(state),
            store,
            gateway,
            mailer,
        }
    }

    /// App without gateway, gateway secret or mailer.
    pub fn unconfigured() -> Router {
        let store = Arc::new(MemoryDocumentStore::new());
        kirana_storefront::app(AppState::builder(test_config(false), store).build())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        send(&self.router, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        send(&self.router, json_request("POST", uri, body)).await
    }

    pub async fn admin(
        &self,
        method: &str,
        uri: &str,
        body: Option<&Value>,
    ) -> (StatusCode, Value) {
        let mut request = match body {
            Some(body) => json_request(method, uri, body),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {ADMIN_TOKEN}").parse().unwrap(),
        );
        send(&self.router, request).await
    }

    pub async fn as_user(
        &self,
        user: &str,
        method: &str,
        uri: &str,
        body: Option<&Value>,
    ) -> (StatusCode, Value) {
        let mut request = match body {
            Some(body) => json_request(method, uri, body),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };
        request
            .headers_mut()
            .insert("x-user-id", user.parse().unwrap());
        send(&self.router, request).await
    }
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Run one request and decode the JSON body (`Null` when empty).
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

/// Store a product with the given fields directly.
pub async fn seed_product(
    app: &TestApp,
    id: &str,
    category: &str,
    price: &str,
    popularity: i64,
    created_at: &str,
) -> kirana_core::Product {
    use kirana_core::{Product, ProductId};
    use kirana_storefront::db::ProductRepository;

    let product = Product {
        id: ProductId::new(id),
        name: format!("{category} {id}"),
        description: String::new(),
        price: price.parse().unwrap(),
        images: vec![format!("https://cdn.kirana.shop/{id}.jpg")],
        category: category.to_string(),
        popularity,
        stock: 10,
        created_at: created_at.parse().unwrap(),
    };
    ProductRepository::new(app.store.as_ref())
        .put(&product)
        .await
        .unwrap();
    product
}
