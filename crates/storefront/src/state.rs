//! Application state shared across handlers.

use std::sync::{Arc, OnceLock};

use crate::config::StorefrontConfig;
use crate::payments::{GatewayError, PaymentGateway, RazorpayClient};
use crate::services::{EmailError, Mailer};
use crate::store::DocumentStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the document store and outbound clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: Arc<dyn DocumentStore>,
    gateway: OnceLock<Arc<dyn PaymentGateway>>,
    mailer: Option<Arc<dyn Mailer>>,
}

impl AppState {
    /// Start building state around a config and a document store.
    #[must_use]
    pub fn builder(config: StorefrontConfig, store: Arc<dyn DocumentStore>) -> AppStateBuilder {
        AppStateBuilder {
            config,
            store,
            gateway: None,
            mailer: None,
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the document store.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    /// Get the payment gateway client, constructing it on first use.
    ///
    /// The client is created once from the configured credentials and
    /// shared by every later request.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotConfigured`] without credentials, or the
    /// construction error if the HTTP client cannot be built.
    pub fn gateway(&self) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
        if let Some(gateway) = self.inner.gateway.get() {
            return Ok(Arc::clone(gateway));
        }

        let config = self
            .inner
            .config
            .razorpay
            .as_ref()
            .ok_or(GatewayError::NotConfigured)?;
        let client: Arc<dyn PaymentGateway> = Arc::new(RazorpayClient::new(config)?);

        // A concurrent first call may have won the race; keep its client.
        Ok(Arc::clone(self.inner.gateway.get_or_init(|| client)))
    }

    /// Get the mailer.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::NotConfigured`] when no relay is configured.
    pub fn mailer(&self) -> Result<&dyn Mailer, EmailError> {
        self.inner
            .mailer
            .as_deref()
            .ok_or(EmailError::NotConfigured)
    }
}

/// Builder for [`AppState`].
pub struct AppStateBuilder {
    config: StorefrontConfig,
    store: Arc<dyn DocumentStore>,
    gateway: Option<Arc<dyn PaymentGateway>>,
    mailer: Option<Arc<dyn Mailer>>,
}

impl AppStateBuilder {
    /// Use a ready-made gateway instead of building one from config.
    #[must_use]
    pub fn gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    #[must_use]
    pub fn mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    #[must_use]
    pub fn build(self) -> AppState {
        let gateway = OnceLock::new();
        if let Some(client) = self.gateway {
            let _ = gateway.set(client);
        }

        AppState {
            inner: Arc::new(AppStateInner {
                config: self.config,
                store: self.store,
                gateway,
                mailer: self.mailer,
            }),
        }
    }
}
