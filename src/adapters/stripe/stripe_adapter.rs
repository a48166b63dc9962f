//! Card payment adapter (Stripe Checkout).
//!
//! Creates one-off Checkout Sessions and verifies `Stripe-Signature`
//! webhooks.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) for replay attack prevention
//! - Secrets handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(credentials).with_base_url(server.uri());
//! let adapter = StripeAdapter::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};

use crate::adapters::upstream;
use crate::config::CardCredentials;
use crate::domain::payment::{
    to_minor_units, GatewayError, OrderRequest, OrderResult, PaymentEvent, PaymentStatus,
    ProviderKind,
};
use crate::domain::signature::{ReplayWindow, SignatureEngine, VerificationKey};
use crate::ports::PaymentProvider;

use super::webhook_types::{CheckoutSession, StripeWebhookEvent};

const PROVIDER: ProviderKind = ProviderKind::Card;

/// Card processor configuration.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: Option<SecretString>,

    /// Base URL for the API (default: https://api.stripe.com).
    api_base_url: String,

    timeout: Duration,

    replay_window: ReplayWindow,
}

impl StripeConfig {
    pub fn new(credentials: CardCredentials) -> Self {
        Self {
            api_key: credentials.secret_key,
            webhook_secret: credentials.webhook_secret,
            api_base_url: "https://api.stripe.com".to_string(),
            timeout: Duration::from_secs(20),
            replay_window: ReplayWindow::default(),
        }
    }

    /// Set a custom API base URL (sandbox proxies, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_replay_window(mut self, window: ReplayWindow) -> Self {
        self.replay_window = window;
        self
    }
}

/// Card payment adapter.
pub struct StripeAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
    signatures: SignatureEngine,
}

impl StripeAdapter {
    pub fn new(config: StripeConfig) -> Result<Self, GatewayError> {
        let http_client = upstream::client(PROVIDER, config.timeout)?;
        let signatures = SignatureEngine::new(config.replay_window);
        Ok(Self {
            config,
            http_client,
            signatures,
        })
    }

    /// Form parameters of a one-item payment-mode Checkout Session.
    fn session_params(request: &OrderRequest) -> Result<Vec<(&'static str, String)>, GatewayError> {
        let currency = request.currency.to_ascii_lowercase();
        let unit_amount = to_minor_units(request.amount, &currency)?;

        Ok(vec![
            ("mode", "payment".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][price_data][currency]", currency),
            (
                "line_items[0][price_data][product_data][name]",
                request.description.clone(),
            ),
            ("line_items[0][price_data][unit_amount]", unit_amount.to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", request.return_url.clone()),
            ("cancel_url", request.cancel_url.clone()),
        ])
    }
}

/// Maps an event type to a payment status. Unlisted types are `Unknown`.
pub fn map_status(event_type: &str, payment_status: Option<&str>) -> PaymentStatus {
    match event_type {
        // Delayed payment methods complete the session before funds arrive.
        "checkout.session.completed" if payment_status == Some("unpaid") => PaymentStatus::Pending,
        "checkout.session.completed"
        | "checkout.session.async_payment_succeeded"
        | "payment_intent.succeeded" => PaymentStatus::Completed,
        "checkout.session.async_payment_failed"
        | "checkout.session.expired"
        | "payment_intent.payment_failed"
        | "payment_intent.canceled" => PaymentStatus::Failed,
        "payment_intent.processing" => PaymentStatus::Pending,
        _ => PaymentStatus::Unknown,
    }
}

#[async_trait]
impl PaymentProvider for StripeAdapter {
    fn kind(&self) -> ProviderKind {
        PROVIDER
    }

    async fn create_order(&self, request: OrderRequest) -> Result<OrderResult, GatewayError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let params = Self::session_params(&request)?;

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .header("Idempotency-Key", &request.idempotency_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| upstream::transport_error(PROVIDER, e))?;

        let (session, raw): (CheckoutSession, _) = upstream::read_json(PROVIDER, response).await?;

        tracing::info!(
            provider = %PROVIDER,
            session_id = %session.id,
            idempotency_key = %request.idempotency_key,
            "checkout session created"
        );

        Ok(OrderResult::created(PROVIDER, session.id, session.url, raw))
    }

    async fn verify_webhook(&self, body: &[u8], headers: &HeaderMap) -> Result<PaymentEvent, GatewayError> {
        let secret = self
            .config
            .webhook_secret
            .as_ref()
            .ok_or_else(|| GatewayError::configuration(PROVIDER, "webhook_secret"))?;

        self.signatures
            .check(
                PROVIDER,
                VerificationKey::Hmac(secret.expose_secret().as_bytes()),
                body,
                headers,
            )
            .map_err(|e| {
                tracing::warn!(provider = %PROVIDER, reason = %e, "webhook signature rejected");
                GatewayError::from(e)
            })?;

        let event: StripeWebhookEvent = serde_json::from_slice(body).map_err(|e| {
            tracing::warn!(provider = %PROVIDER, error = %e, "failed to parse webhook payload");
            GatewayError::validation(format!("invalid webhook payload: {}", e))
        })?;

        let status = map_status(&event.event_type, event.data.object.payment_status.as_deref());
        tracing::info!(
            provider = %PROVIDER,
            event_id = %event.id,
            event_type = %event.event_type,
            ?status,
            "webhook verified"
        );

        Ok(PaymentEvent::verified(
            PROVIDER,
            event.data.object.id,
            event.event_type,
            status,
            body,
        ))
    }
}
