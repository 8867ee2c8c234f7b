//! # Stripe Client
//!
//! Implementation of the payment provider surface against the Stripe REST
//! API: Checkout Sessions creation, webhook signature verification, and the
//! follow-up reads (session line items, products) the webhook flow needs.

use crate::config::StripeConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use shop_core::{
    CheckoutSession, CheckoutSessionRequest, CompletedSession, PaymentError, PaymentProvider,
    PaymentResult, ProviderProduct, SessionLineItem, WebhookEvent, WebhookEventType,
};
use std::collections::HashMap;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Stripe payment provider client
///
/// Uses Stripe's hosted checkout page; the gateway never touches card data.
pub struct StripeClient {
    config: StripeConfig,
    client: Client,
}

impl StripeClient {
    /// Create a new Stripe client
    pub fn new(config: StripeConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        let config = StripeConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Build the form parameters for a session-creation call
    fn session_params(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
            ("customer_email".to_string(), request.customer_email.clone()),
            (
                "client_reference_id".to_string(),
                request.client_reference_id.clone(),
            ),
            (
                "shipping_options[0][shipping_rate]".to_string(),
                request.shipping_rate.clone(),
            ),
        ];

        for (i, item) in request.line_items.iter().enumerate() {
            params.push((
                format!("line_items[{}][price_data][currency]", i),
                request.currency.as_str().to_string(),
            ));
            params.push((
                format!("line_items[{}][price_data][unit_amount]", i),
                item.unit_amount.to_string(),
            ));
            params.push((
                format!("line_items[{}][price_data][product_data][name]", i),
                item.name.clone(),
            ));
            params.push((
                format!("line_items[{}][price_data][product_data][images][0]", i),
                item.image.clone(),
            ));
            params.push((
                format!(
                    "line_items[{}][price_data][product_data][metadata][productId]",
                    i
                ),
                item.product_id.clone(),
            ));
            params.push((format!("line_items[{}][quantity]", i), item.quantity.to_string()));
        }

        for (key, value) in &request.metadata {
            params.push((format!("metadata[{}]", key), value.clone()));
        }

        params
    }

    async fn post_form(&self, path: &str, params: &[(String, String)]) -> PaymentResult<String> {
        let url = format!("{}{}", self.config.api_base_url, path);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .form(params)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        Self::read_body(response).await
    }

    async fn get(&self, path: &str) -> PaymentResult<String> {
        let url = format!("{}{}", self.config.api_base_url, path);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        Self::read_body(response).await
    }

    async fn read_body(response: reqwest::Response) -> PaymentResult<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(PaymentError::ProviderError {
                    provider: "stripe".to_string(),
                    message: error_response.error.message,
                });
            }

            return Err(PaymentError::ProviderError {
                provider: "stripe".to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    #[instrument(skip(self, request), fields(items = request.line_items.len()))]
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> PaymentResult<CheckoutSession> {
        let params = Self::session_params(request);

        debug!(
            "Creating Stripe checkout session: {} items, rate={}",
            request.line_items.len(),
            request.shipping_rate
        );

        let body = self.post_form("/v1/checkout/sessions", &params).await?;

        let session: StripeSessionResponse = serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        info!(
            "Created Stripe checkout session: id={}, url={}",
            session.id, session.url
        );

        Ok(CheckoutSession {
            session_id: session.id,
            url: session.url,
        })
    }

    #[instrument(skip(self, payload, signature))]
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> PaymentResult<WebhookEvent> {
        let sig_parts = parse_signature_header(signature)?;

        // Reject stale signatures (replay window)
        let timestamp = sig_parts.timestamp;
        let now = Utc::now().timestamp();
        let tolerance = 300; // 5 minutes

        if (now - timestamp).abs() > tolerance {
            return Err(PaymentError::WebhookVerificationFailed(
                "Timestamp outside tolerance".to_string(),
            ));
        }

        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
        let expected_sig = compute_hmac_sha256(&self.config.webhook_secret, &signed_payload);

        let valid = sig_parts
            .signatures
            .iter()
            .any(|sig| constant_time_compare(sig, &expected_sig));

        if !valid {
            return Err(PaymentError::WebhookVerificationFailed(
                "Signature mismatch".to_string(),
            ));
        }

        let event: StripeEvent = serde_json::from_slice(payload).map_err(|e| {
            PaymentError::WebhookParseError(format!("Failed to parse webhook: {}", e))
        })?;

        debug!("Verified Stripe webhook: type={}", event.event_type);

        let event_type = match event.event_type.as_str() {
            "checkout.session.completed" => WebhookEventType::CheckoutCompleted,
            "payment_intent.succeeded" => WebhookEventType::PaymentSucceeded,
            "payment_intent.payment_failed" => WebhookEventType::PaymentFailed,
            other => WebhookEventType::Unknown(other.to_string()),
        };

        let session = if event_type == WebhookEventType::CheckoutCompleted {
            let object: StripeSessionObject =
                serde_json::from_value(serde_json::Value::Object(event.data.object)).map_err(
                    |e| {
                        PaymentError::WebhookParseError(format!(
                            "Failed to parse session object: {}",
                            e
                        ))
                    },
                )?;
            Some(object.into_session())
        } else {
            None
        };

        Ok(WebhookEvent {
            event_id: event.id,
            event_type,
            session,
            timestamp: DateTime::from_timestamp(event.created, 0).unwrap_or_else(Utc::now),
        })
    }

    #[instrument(skip(self))]
    async fn list_line_items(&self, session_id: &str) -> PaymentResult<Vec<SessionLineItem>> {
        let body = self
            .get(&format!("/v1/checkout/sessions/{}/line_items", session_id))
            .await?;

        let list: StripeListResponse = serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse line items: {}", e))
        })?;

        Ok(list
            .data
            .into_iter()
            .map(|item| SessionLineItem {
                unit_amount_minor: item
                    .price
                    .unit_amount_decimal
                    .as_deref()
                    .and_then(|raw| raw.parse::<f64>().ok())
                    .or(item.price.unit_amount.map(|amount| amount as f64))
                    .unwrap_or(0.0),
                product_ref: item.price.product,
                quantity: item.quantity.unwrap_or(1),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn retrieve_product(&self, product_ref: &str) -> PaymentResult<ProviderProduct> {
        let body = self.get(&format!("/v1/products/{}", product_ref)).await?;

        let product: StripeProductObject = serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse product: {}", e))
        })?;

        Ok(ProviderProduct {
            provider_id: product.id,
            name: product.name,
            images: product.images,
            metadata: product.metadata,
        })
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeSessionResponse {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct StripeEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    created: i64,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StripeSessionObject {
    id: String,
    #[serde(default)]
    client_reference_id: Option<String>,
    #[serde(default)]
    customer_email: Option<String>,
    #[serde(default)]
    customer_details: Option<StripeCustomerDetails>,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    total_details: StripeTotalDetails,
    #[serde(default)]
    payment_intent: Option<String>,
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

impl StripeSessionObject {
    fn into_session(self) -> CompletedSession {
        CompletedSession {
            session_id: self.id,
            client_reference_id: self.client_reference_id,
            customer_email: self
                .customer_details
                .and_then(|details| details.email)
                .or(self.customer_email),
            amount_total: self.amount_total.unwrap_or(0),
            amount_tax: self.total_details.amount_tax,
            amount_shipping: self.total_details.amount_shipping,
            payment_intent: self.payment_intent,
            payment_status: self.payment_status.unwrap_or_else(|| "unknown".to_string()),
            metadata: self.metadata,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeCustomerDetails {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StripeTotalDetails {
    #[serde(default)]
    amount_tax: i64,
    #[serde(default)]
    amount_shipping: i64,
}

#[derive(Debug, Deserialize)]
struct StripeListResponse {
    #[serde(default)]
    data: Vec<StripeLineItemObject>,
}

#[derive(Debug, Deserialize)]
struct StripeLineItemObject {
    #[serde(default)]
    quantity: Option<u32>,
    price: StripePriceObject,
}

#[derive(Debug, Deserialize)]
struct StripePriceObject {
    product: String,
    #[serde(default)]
    unit_amount_decimal: Option<String>,
    #[serde(default)]
    unit_amount: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeProductObject {
    id: String,
    name: String,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

// =============================================================================
// Webhook Signature Verification
// =============================================================================

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> PaymentResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let kv: Vec<&str> = part.split('=').collect();
        if kv.len() != 2 {
            continue;
        }
        match kv[0] {
            "t" => {
                timestamp = kv[1].parse().ok();
            }
            "v1" => {
                signatures.push(kv[1].to_string());
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        PaymentError::WebhookVerificationFailed("Missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(PaymentError::WebhookVerificationFailed(
            "No v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn compute_hmac_sha256(secret: &str, message: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    let result = mac.finalize();
    hex::encode(result.into_bytes())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}
