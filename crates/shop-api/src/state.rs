//! # Application State
//!
//! Shared state for the Axum application: the two checkout components wired
//! to their collaborators, plus server configuration. Collaborators are
//! injected through `with_collaborators`, which is also the seam tests use
//! to substitute doubles.

use shop_core::{
    BoxedOrderStore, BoxedPaymentProvider, CheckoutPolicy, CheckoutSessionCreator, Currency,
    InMemoryOrderStore, PaymentError, PaymentResult, WebhookIngestor,
};
use shop_stripe::StripeClient;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Storefront base URL for checkout redirects
    pub frontend_url: String,
    /// Checkout currency
    pub currency: Currency,
    /// Subtotal at or above which the free shipping rate applies
    pub free_shipping_threshold: f64,
    /// Provider-side shipping rate applied at or above the threshold
    pub shipping_rate_free: String,
    /// Provider-side shipping rate applied below the threshold
    pub shipping_rate_standard: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        dotenvy::dotenv().ok();

        let currency_code =
            std::env::var("CHECKOUT_CURRENCY").unwrap_or_else(|_| "usd".to_string());

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            currency: Currency::from_code(&currency_code)?,
            free_shipping_threshold: std::env::var("FREE_SHIPPING_THRESHOLD")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(200.0),
            shipping_rate_free: std::env::var("SHIPPING_RATE_FREE").map_err(|_| {
                PaymentError::Configuration("SHIPPING_RATE_FREE not set".to_string())
            })?,
            shipping_rate_standard: std::env::var("SHIPPING_RATE_STANDARD").map_err(|_| {
                PaymentError::Configuration("SHIPPING_RATE_STANDARD not set".to_string())
            })?,
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Checkout policy derived from the configured values
    pub fn checkout_policy(&self) -> CheckoutPolicy {
        CheckoutPolicy::new(
            self.currency,
            self.frontend_url.clone(),
            self.free_shipping_threshold,
            self.shipping_rate_free.clone(),
            self.shipping_rate_standard.clone(),
        )
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Translates carts into hosted checkout sessions
    pub creator: Arc<CheckoutSessionCreator>,
    /// Verifies payment events and materializes orders
    pub ingestor: Arc<WebhookIngestor>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state with the Stripe client and the in-memory order store
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let stripe = StripeClient::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        let orders: BoxedOrderStore = Arc::new(InMemoryOrderStore::new());

        Ok(Self::with_collaborators(config, Arc::new(stripe), orders))
    }

    /// Wire the components to explicit collaborators
    pub fn with_collaborators(
        config: AppConfig,
        provider: BoxedPaymentProvider,
        orders: BoxedOrderStore,
    ) -> Self {
        let creator = CheckoutSessionCreator::new(config.checkout_policy(), provider.clone());
        let ingestor = WebhookIngestor::new(provider, orders);

        Self {
            creator: Arc::new(creator),
            ingestor: Arc::new(ingestor),
            config,
        }
    }
}
