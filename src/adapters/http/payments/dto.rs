//! HTTP DTOs (Data Transfer Objects) for payment endpoints.
//!
//! Request bodies keep the field names each endpoint has always accepted;
//! they are mapped onto the provider-neutral [`OrderRequest`] here.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::payment::{ErrorEnvelope, GatewayError, OrderRequest, OrderResult, ProviderKind};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Amount as sent by callers: decimal text or a JSON number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(serde_json::Number),
}

impl AmountInput {
    pub fn to_decimal(&self) -> Result<Decimal, GatewayError> {
        let text = match self {
            AmountInput::Text(text) => text.trim().to_string(),
            AmountInput::Number(number) => number.to_string(),
        };
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|_| GatewayError::validation(format!("amount '{}' is not a decimal number", text)))
    }
}

fn required_amount(amount: &Option<AmountInput>) -> Result<Decimal, GatewayError> {
    amount
        .as_ref()
        .ok_or_else(|| GatewayError::validation("amount is required"))?
        .to_decimal()
}

/// `POST /orders/card`
#[derive(Debug, Clone, Deserialize)]
pub struct CardOrderRequest {
    pub amount: Option<AmountInput>,
    #[serde(default = "default_card_currency")]
    pub currency: String,
    /// Product name on the checkout page.
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default = "default_success_url")]
    pub success_url: String,
    #[serde(default = "default_cancel_url")]
    pub cancel_url: String,
}

/// `POST /orders/crypto`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoOrderRequest {
    pub amount: Option<AmountInput>,
    #[serde(default = "default_crypto_currency")]
    pub currency: String,
    #[serde(default)]
    pub goods_name: Option<String>,
    #[serde(default)]
    pub return_url: String,
}

/// `POST /orders/wallet`
#[derive(Debug, Clone, Deserialize)]
pub struct WalletOrderRequest {
    pub amount: Option<AmountInput>,
    #[serde(default = "default_wallet_currency")]
    pub currency: String,
    #[serde(default)]
    pub return_url: String,
    #[serde(default)]
    pub cancel_url: String,
}

fn default_card_currency() -> String {
    "usd".to_string()
}

fn default_crypto_currency() -> String {
    "USDT".to_string()
}

fn default_wallet_currency() -> String {
    "USD".to_string()
}

fn default_success_url() -> String {
    "https://example.com/success".to_string()
}

fn default_cancel_url() -> String {
    "https://example.com/cancel".to_string()
}

impl CardOrderRequest {
    pub fn into_order(self, idempotency_key: Option<String>) -> Result<OrderRequest, GatewayError> {
        let request = OrderRequest::new(ProviderKind::Card, required_amount(&self.amount)?, self.currency)
            .with_description(self.product.unwrap_or_default())
            .with_return_url(self.success_url)
            .with_cancel_url(self.cancel_url);
        Ok(with_key(request, idempotency_key))
    }
}

impl CryptoOrderRequest {
    pub fn into_order(self, idempotency_key: Option<String>) -> Result<OrderRequest, GatewayError> {
        let request = OrderRequest::new(ProviderKind::Crypto, required_amount(&self.amount)?, self.currency)
            .with_description(self.goods_name.unwrap_or_default())
            .with_return_url(self.return_url);
        Ok(with_key(request, idempotency_key))
    }
}

impl WalletOrderRequest {
    pub fn into_order(self, idempotency_key: Option<String>) -> Result<OrderRequest, GatewayError> {
        let request = OrderRequest::new(ProviderKind::Wallet, required_amount(&self.amount)?, self.currency)
            .with_return_url(self.return_url)
            .with_cancel_url(self.cancel_url);
        Ok(with_key(request, idempotency_key))
    }
}

fn with_key(request: OrderRequest, idempotency_key: Option<String>) -> OrderRequest {
    match idempotency_key {
        Some(key) => request.with_idempotency_key(key),
        None => request,
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Card order created: where to send the payer.
#[derive(Debug, Clone, Serialize)]
pub struct CardOrderResponse {
    pub ok: bool,
    pub url: Option<String>,
    pub order_id: String,
}

/// Crypto order created: the provider's `data` object.
#[derive(Debug, Clone, Serialize)]
pub struct CryptoOrderResponse {
    pub ok: bool,
    pub data: serde_json::Value,
}

/// Wallet order created: the provider's order object.
#[derive(Debug, Clone, Serialize)]
pub struct WalletOrderResponse {
    pub ok: bool,
    pub order: serde_json::Value,
}

impl From<OrderResult> for CardOrderResponse {
    fn from(result: OrderResult) -> Self {
        Self {
            ok: result.ok,
            url: result.redirect_url,
            order_id: result.provider_order_id,
        }
    }
}

impl From<OrderResult> for CryptoOrderResponse {
    fn from(result: OrderResult) -> Self {
        let data = result
            .raw_provider_payload
            .get("data")
            .cloned()
            .unwrap_or_else(|| serde_json::json!({}));
        Self { ok: result.ok, data }
    }
}

impl From<OrderResult> for WalletOrderResponse {
    fn from(result: OrderResult) -> Self {
        Self {
            ok: result.ok,
            order: result.raw_provider_payload,
        }
    }
}

/// Failure body shared by every order endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub error: ErrorEnvelope,
}

impl ErrorResponse {
    pub fn new(error: &GatewayError) -> Self {
        Self {
            ok: false,
            error: error.envelope(),
        }
    }
}

/// `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub providers: Vec<ProviderKind>,
}
