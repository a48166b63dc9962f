//! Wallet payment adapter (PayPal Orders v2).
//!
//! Authenticates with an OAuth2 client-credentials bearer token held in a
//! [`TokenCache`]. Webhooks are verified remotely through the provider's
//! verify-webhook-signature API; there is no local signature scheme.

use std::time::Duration;

use async_trait::async_trait;
use http::HeaderMap;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde_json::value::RawValue;

use crate::adapters::upstream;
use crate::config::WalletCredentials;
use crate::domain::payment::{
    currency_exponent, to_minor_units, GatewayError, OrderRequest, OrderResult, PaymentEvent,
    PaymentStatus, ProviderKind,
};
use crate::domain::signature::ReplayWindow;
use crate::ports::PaymentProvider;

use super::token_cache::TokenCache;
use super::types::{
    AccessTokenResponse, Amount, ApplicationContext, CreateOrderBody, Order, PurchaseUnit,
    VerifySignatureRequest, VerifySignatureResponse, WebhookEvent,
};

const PROVIDER: ProviderKind = ProviderKind::Wallet;

pub const TRANSMISSION_ID_HEADER: &str = "PAYPAL-TRANSMISSION-ID";
pub const TRANSMISSION_TIME_HEADER: &str = "PAYPAL-TRANSMISSION-TIME";
pub const TRANSMISSION_SIG_HEADER: &str = "PAYPAL-TRANSMISSION-SIG";
pub const CERT_URL_HEADER: &str = "PAYPAL-CERT-URL";
pub const AUTH_ALGO_HEADER: &str = "PAYPAL-AUTH-ALGO";

/// Wallet processor configuration.
#[derive(Debug, Clone)]
pub struct PayPalConfig {
    client_id: String,
    client_secret: SecretString,
    webhook_id: Option<String>,
    /// Sandbox by default.
    api_base_url: String,
    timeout: Duration,
    replay_window: ReplayWindow,
}

impl PayPalConfig {
    pub fn new(credentials: WalletCredentials) -> Self {
        Self {
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            webhook_id: credentials.webhook_id,
            api_base_url: "https://api-m.sandbox.paypal.com".to_string(),
            timeout: Duration::from_secs(20),
            replay_window: ReplayWindow::default(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bounds the age of `PAYPAL-TRANSMISSION-TIME` on inbound webhooks.
    pub fn with_replay_window(mut self, window: ReplayWindow) -> Self {
        self.replay_window = window;
        self
    }
}

/// Wallet payment adapter.
pub struct PayPalAdapter {
    config: PayPalConfig,
    http_client: reqwest::Client,
    tokens: TokenCache,
}

impl PayPalAdapter {
    pub fn new(config: PayPalConfig) -> Result<Self, GatewayError> {
        let http_client = upstream::client(PROVIDER, config.timeout)?;
        Ok(Self {
            config,
            http_client,
            tokens: TokenCache::default(),
        })
    }

    /// Cached access token, exchanging client credentials when needed.
    async fn access_token(&self) -> Result<SecretString, GatewayError> {
        self.tokens.get_or_refresh(|| self.exchange_token()).await
    }

    async fn exchange_token(&self) -> Result<(SecretString, Duration), GatewayError> {
        tracing::debug!(provider = %PROVIDER, "exchanging client credentials for access token");

        let response = self
            .http_client
            .post(format!("{}/v1/oauth2/token", self.config.api_base_url))
            .basic_auth(&self.config.client_id, Some(self.config.client_secret.expose_secret()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| upstream::transport_error(PROVIDER, e))?;

        let (token, _): (AccessTokenResponse, _) = upstream::read_json(PROVIDER, response).await?;
        Ok((
            SecretString::new(token.access_token),
            Duration::from_secs(token.expires_in),
        ))
    }

    /// Bearer-authenticated JSON POST. A 401 drops the token that was used.
    async fn authorized_post<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        request_id: Option<&str>,
    ) -> Result<reqwest::Response, GatewayError> {
        let token = self.access_token().await?;

        let mut builder = self
            .http_client
            .post(format!("{}{}", self.config.api_base_url, path))
            .bearer_auth(token.expose_secret())
            .json(body);
        if let Some(request_id) = request_id {
            builder = builder.header("PayPal-Request-Id", request_id);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| upstream::transport_error(PROVIDER, e))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!(provider = %PROVIDER, "access token rejected, invalidating cache");
            self.tokens.invalidate(&token).await;
        }
        Ok(response)
    }

    fn order_body(request: &OrderRequest) -> Result<CreateOrderBody, GatewayError> {
        let currency = request.currency.to_ascii_uppercase();
        let value = format_value(request.amount, &currency)?;

        Ok(CreateOrderBody {
            intent: "CAPTURE",
            purchase_units: vec![PurchaseUnit {
                amount: Amount {
                    currency_code: currency,
                    value,
                },
                description: Some(request.description.clone()).filter(|d| !d.is_empty()),
            }],
            application_context: ApplicationContext {
                return_url: request.return_url.clone(),
                cancel_url: request.cancel_url.clone(),
            },
        })
    }
}

/// Amount text with exactly the currency's decimals ("10" USD becomes "10.00").
fn format_value(amount: Decimal, currency: &str) -> Result<String, GatewayError> {
    // Rejects precision the currency cannot carry.
    to_minor_units(amount, currency)?;
    let mut value = amount;
    value.rescale(currency_exponent(currency));
    Ok(value.to_string())
}

/// Maps an event type to a payment status. Unlisted types are `Unknown`.
pub fn map_status(event_type: &str) -> PaymentStatus {
    match event_type {
        "PAYMENT.CAPTURE.COMPLETED" => PaymentStatus::Completed,
        "PAYMENT.CAPTURE.DENIED"
        | "PAYMENT.CAPTURE.DECLINED"
        | "CHECKOUT.PAYMENT-APPROVAL.REVERSED" => PaymentStatus::Failed,
        "PAYMENT.CAPTURE.PENDING" | "CHECKOUT.ORDER.APPROVED" => PaymentStatus::Pending,
        _ => PaymentStatus::Unknown,
    }
}

fn transmission_header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, GatewayError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| GatewayError::signature(format!("missing {} header", name)))
}

/// Checks an RFC 3339 transmission time against `window`.
fn check_transmission_time(value: &str, window: &ReplayWindow) -> Result<(), GatewayError> {
    let sent_at = chrono::DateTime::parse_from_rfc3339(value)
        .map_err(|_| GatewayError::signature(format!("invalid {} header", TRANSMISSION_TIME_HEADER)))?;
    window
        .check(sent_at.timestamp_millis(), chrono::Utc::now().timestamp_millis())
        .map_err(GatewayError::from)
}

#[async_trait]
impl PaymentProvider for PayPalAdapter {
    fn kind(&self) -> ProviderKind {
        PROVIDER
    }

    async fn create_order(&self, request: OrderRequest) -> Result<OrderResult, GatewayError> {
        let body = Self::order_body(&request)?;

        let response = self
            .authorized_post("/v2/checkout/orders", &body, Some(&request.idempotency_key))
            .await?;
        let (order, raw): (Order, _) = upstream::read_json(PROVIDER, response).await?;

        tracing::info!(
            provider = %PROVIDER,
            order_id = %order.id,
            idempotency_key = %request.idempotency_key,
            "wallet order created"
        );

        let approve_url = order.approve_url();
        Ok(OrderResult::created(PROVIDER, order.id, approve_url, raw))
    }

    async fn verify_webhook(&self, body: &[u8], headers: &HeaderMap) -> Result<PaymentEvent, GatewayError> {
        let webhook_id = self
            .config
            .webhook_id
            .as_deref()
            .ok_or_else(|| GatewayError::configuration(PROVIDER, "webhook_id"))?;

        let raw_event: &RawValue = serde_json::from_slice(body)
            .map_err(|e| GatewayError::signature(format!("webhook body is not JSON: {}", e)))?;

        let verify_request = VerifySignatureRequest {
            auth_algo: transmission_header(headers, AUTH_ALGO_HEADER)?,
            cert_url: transmission_header(headers, CERT_URL_HEADER)?,
            transmission_id: transmission_header(headers, TRANSMISSION_ID_HEADER)?,
            transmission_sig: transmission_header(headers, TRANSMISSION_SIG_HEADER)?,
            transmission_time: transmission_header(headers, TRANSMISSION_TIME_HEADER)?,
            webhook_id,
            webhook_event: raw_event,
        };

        check_transmission_time(verify_request.transmission_time, &self.config.replay_window).map_err(|e| {
            tracing::warn!(provider = %PROVIDER, reason = %e, "webhook transmission time rejected");
            e
        })?;

        let response = self
            .authorized_post("/v1/notifications/verify-webhook-signature", &verify_request, None)
            .await?;
        let (verdict, _): (VerifySignatureResponse, _) = upstream::read_json(PROVIDER, response).await?;

        if verdict.verification_status != "SUCCESS" {
            tracing::warn!(
                provider = %PROVIDER,
                verification_status = %verdict.verification_status,
                "webhook signature rejected"
            );
            return Err(GatewayError::signature(format!(
                "provider reported verification status {}",
                verdict.verification_status
            )));
        }

        let event: WebhookEvent = serde_json::from_slice(body)
            .map_err(|e| GatewayError::validation(format!("invalid webhook payload: {}", e)))?;
        let order_id = event
            .order_id()
            .ok_or_else(|| GatewayError::validation("webhook event has no resource id"))?;

        let status = map_status(&event.event_type);
        tracing::info!(
            provider = %PROVIDER,
            event_id = %event.id,
            event_type = %event.event_type,
            ?status,
            "webhook verified"
        );

        Ok(PaymentEvent::verified(PROVIDER, order_id, event.event_type, status, body))
    }
}
