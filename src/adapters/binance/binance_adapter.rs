//! Crypto payment adapter (Binance Pay).
//!
//! Every API call is a signed JSON POST: the body is serialized once, the
//! exact bytes are signed with HMAC-SHA512 and the same bytes are sent.
//! Notifications are verified with the provider's RSA public key for the
//! certificate serial named in the request.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use http::HeaderMap;
use rsa::RsaPublicKey;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::adapters::upstream;
use crate::config::CryptoCredentials;
use crate::domain::payment::{
    ensure_positive, merchant_trade_no, nonce, GatewayError, OrderRequest, OrderResult,
    PaymentEvent, PaymentStatus, ProviderKind,
};
use crate::domain::signature::crypto::{
    self as crypto_signature, CERTIFICATE_SN_HEADER, NONCE_HEADER, SIGNATURE_HEADER,
    TIMESTAMP_HEADER,
};
use crate::domain::signature::{ReplayWindow, SignatureEngine, SignaturePayload, VerificationKey};
use crate::ports::PaymentProvider;

use super::certificate_cache::CertificateCache;
use super::types::{
    ApiResponse, Certificate, CreateOrderBody, Env, Goods, Merchant, OrderData,
    WebhookNotification, WebhookOrderData,
};

const PROVIDER: ProviderKind = ProviderKind::Crypto;

/// Most decimal places accepted for an order amount.
const MAX_AMOUNT_SCALE: u32 = 8;

/// Crypto-pay configuration.
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    secret_key: SecretString,
    certificate_sn: String,
    merchant_id: Option<String>,
    api_base_url: String,
    notify_url: Option<String>,
    trade_no_prefix: String,
    timeout: Duration,
    replay_window: ReplayWindow,
    certificate_ttl: Duration,
}

impl BinanceConfig {
    pub fn new(credentials: CryptoCredentials) -> Self {
        Self {
            secret_key: credentials.secret_key,
            certificate_sn: credentials.certificate_sn,
            merchant_id: credentials.merchant_id,
            api_base_url: "https://bpay.binanceapi.com".to_string(),
            notify_url: None,
            trade_no_prefix: "MANY".to_string(),
            timeout: Duration::from_secs(20),
            replay_window: ReplayWindow::default(),
            certificate_ttl: Duration::from_secs(3600),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Where the provider should post payment notifications.
    pub fn with_notify_url(mut self, url: Option<String>) -> Self {
        self.notify_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn with_trade_no_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.trade_no_prefix = prefix.into();
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

    pub fn with_certificate_ttl(mut self, ttl: Duration) -> Self {
        self.certificate_ttl = ttl;
        self
    }
}

/// Crypto payment adapter.
pub struct BinanceAdapter {
    config: BinanceConfig,
    http_client: reqwest::Client,
    signatures: SignatureEngine,
    certificates: CertificateCache,
}

impl BinanceAdapter {
    pub fn new(config: BinanceConfig) -> Result<Self, GatewayError> {
        let http_client = upstream::client(PROVIDER, config.timeout)?;
        let signatures = SignatureEngine::new(config.replay_window);
        let certificates = CertificateCache::new(config.certificate_ttl);
        Ok(Self {
            config,
            http_client,
            signatures,
            certificates,
        })
    }

    fn order_body(&self, request: &OrderRequest) -> Result<CreateOrderBody, GatewayError> {
        ensure_positive(request.amount)?;
        if request.amount.scale() > MAX_AMOUNT_SCALE {
            return Err(GatewayError::validation(format!(
                "amount {} has more than {} decimal places",
                request.amount, MAX_AMOUNT_SCALE
            )));
        }

        Ok(CreateOrderBody {
            merchant_trade_no: merchant_trade_no(&self.config.trade_no_prefix),
            order_amount: format_amount(request.amount),
            currency: request.currency.to_ascii_uppercase(),
            goods: Goods {
                goods_type: "DIGITAL",
                goods_name: request.description.clone(),
            },
            merchant: Merchant {
                merchant_id: self.config.merchant_id.clone(),
            },
            env: Env { terminal_type: "WEB" },
            notify_url: self.config.notify_url.clone(),
            return_url: request.return_url.clone(),
        })
    }

    /// Signs and posts `body`; the bytes signed are the bytes sent.
    async fn signed_post<B, T>(&self, path: &str, body: &B) -> Result<(ApiResponse<T>, serde_json::Value), GatewayError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| GatewayError::validation(format!("unserializable request: {}", e)))?;
        let payload = SignaturePayload::new(bytes, chrono::Utc::now().timestamp_millis(), nonce());
        let signature = self
            .signatures
            .sign(PROVIDER, self.config.secret_key.expose_secret().as_bytes(), &payload)
            .unwrap_or_default();

        let response = self
            .http_client
            .post(format!("{}{}", self.config.api_base_url, path))
            .header("Content-Type", "application/json")
            .header(TIMESTAMP_HEADER, payload.timestamp.to_string())
            .header(NONCE_HEADER, payload.nonce.as_str())
            .header(CERTIFICATE_SN_HEADER, self.config.certificate_sn.as_str())
            .header(SIGNATURE_HEADER, signature)
            .body(payload.canonical_body)
            .send()
            .await
            .map_err(|e| upstream::transport_error(PROVIDER, e))?;

        let status = response.status().as_u16();
        let (envelope, raw): (ApiResponse<T>, _) = upstream::read_json(PROVIDER, response).await?;

        if !envelope.is_success() {
            tracing::warn!(
                provider = %PROVIDER,
                code = %envelope.code,
                "provider answered with a failure status"
            );
            return Err(GatewayError::Upstream {
                provider: PROVIDER,
                status: Some(status),
                body: raw.to_string(),
                message: format!(
                    "provider returned {} ({}): {}",
                    envelope.status,
                    envelope.code,
                    envelope.error_message.as_deref().unwrap_or("no message")
                ),
            });
        }

        Ok((envelope, raw))
    }

    /// Public key for `serial`, refreshing the certificate set when needed.
    async fn public_key(&self, serial: &str) -> Result<RsaPublicKey, GatewayError> {
        self.certificates
            .get_or_refresh(serial, || self.fetch_certificates())
            .await
    }

    async fn fetch_certificates(&self) -> Result<HashMap<String, RsaPublicKey>, GatewayError> {
        tracing::debug!(provider = %PROVIDER, "fetching provider certificates");

        let (envelope, _): (ApiResponse<Vec<Certificate>>, _) = self
            .signed_post("/binancepay/openapi/certificates", &serde_json::json!({}))
            .await?;

        let mut keys = HashMap::new();
        for certificate in envelope.data.unwrap_or_default() {
            match crypto_signature::parse_public_key(&certificate.cert_public) {
                Ok(key) => {
                    keys.insert(certificate.cert_serial, key);
                }
                Err(e) => {
                    tracing::warn!(
                        provider = %PROVIDER,
                        serial = %certificate.cert_serial,
                        error = %e,
                        "skipping unparseable provider certificate"
                    );
                }
            }
        }

        tracing::debug!(provider = %PROVIDER, count = keys.len(), "provider certificates loaded");
        Ok(keys)
    }
}

/// Order amounts go out as plain decimal text ("10.00", never "1E+1").
fn format_amount(amount: Decimal) -> String {
    amount.to_string()
}

/// Maps `bizStatus`. Unlisted values are `Unknown`.
pub fn map_status(biz_status: Option<&str>) -> PaymentStatus {
    match biz_status {
        Some("PAY_SUCCESS") => PaymentStatus::Completed,
        Some("PAY_CLOSED") => PaymentStatus::Failed,
        _ => PaymentStatus::Unknown,
    }
}

#[async_trait]
impl PaymentProvider for BinanceAdapter {
    fn kind(&self) -> ProviderKind {
        PROVIDER
    }

    async fn create_order(&self, request: OrderRequest) -> Result<OrderResult, GatewayError> {
        let body = self.order_body(&request)?;
        let trade_no = body.merchant_trade_no.clone();

        let (envelope, raw): (ApiResponse<OrderData>, _) =
            self.signed_post("/binancepay/openapi/v2/order", &body).await?;

        let data = envelope.data.ok_or_else(|| GatewayError::Upstream {
            provider: PROVIDER,
            status: Some(200),
            body: raw.to_string(),
            message: "provider response has no order data".to_string(),
        })?;

        tracing::info!(
            provider = %PROVIDER,
            merchant_trade_no = %trade_no,
            prepay_id = %data.prepay_id,
            idempotency_key = %request.idempotency_key,
            "crypto order created"
        );

        Ok(OrderResult::created(PROVIDER, data.prepay_id, data.checkout_url, raw))
    }

    async fn verify_webhook(&self, body: &[u8], headers: &HeaderMap) -> Result<PaymentEvent, GatewayError> {
        let parsed = crypto_signature::WebhookHeaders::from_headers(headers).map_err(|e| {
            tracing::warn!(provider = %PROVIDER, reason = %e, "webhook headers rejected");
            GatewayError::from(e)
        })?;

        // Stale or future-dated deliveries never reach the certificate endpoint.
        self.config
            .replay_window
            .check(parsed.timestamp, chrono::Utc::now().timestamp_millis())
            .map_err(|e| {
                tracing::warn!(provider = %PROVIDER, reason = %e, "webhook timestamp rejected");
                GatewayError::from(e)
            })?;

        let key = self.public_key(&parsed.certificate_sn).await?;

        self.signatures
            .check(PROVIDER, VerificationKey::Rsa(&key), body, headers)
            .map_err(|e| {
                tracing::warn!(provider = %PROVIDER, reason = %e, "webhook signature rejected");
                GatewayError::from(e)
            })?;

        let notification: WebhookNotification = serde_json::from_slice(body)
            .map_err(|e| GatewayError::validation(format!("invalid webhook payload: {}", e)))?;
        let order: WebhookOrderData = serde_json::from_str(&notification.data)
            .map_err(|e| GatewayError::validation(format!("invalid webhook data field: {}", e)))?;

        let status = map_status(notification.biz_status.as_deref());
        tracing::info!(
            provider = %PROVIDER,
            merchant_trade_no = %order.merchant_trade_no,
            ?status,
            "webhook verified"
        );

        Ok(PaymentEvent::verified(
            PROVIDER,
            order.merchant_trade_no,
            notification.biz_type.unwrap_or_else(|| "PAY".to_string()),
            status,
            body,
        ))
    }
}
