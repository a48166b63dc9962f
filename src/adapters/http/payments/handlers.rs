//! HTTP handlers for order creation and webhook delivery.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::PaymentGateway;
use crate::domain::payment::{GatewayError, ProviderKind, WebhookDisposition};

use super::dto::{
    CardOrderRequest, CardOrderResponse, CryptoOrderRequest, CryptoOrderResponse, ErrorResponse,
    HealthResponse, WalletOrderRequest, WalletOrderResponse,
};

/// Optional caller-supplied idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state: the gateway facade.
#[derive(Clone)]
pub struct PaymentsAppState {
    pub gateway: Arc<PaymentGateway>,
}

impl PaymentsAppState {
    pub fn new(gateway: Arc<PaymentGateway>) -> Self {
        Self { gateway }
    }
}

fn idempotency_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ════════════════════════════════════════════════════════════════════════════════
// Order Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /orders/card - Create a hosted card checkout session
pub async fn create_card_order(
    State(state): State<PaymentsAppState>,
    headers: HeaderMap,
    body: Result<Json<CardOrderRequest>, JsonRejection>,
) -> Result<Json<CardOrderResponse>, PaymentsApiError> {
    let Json(body) = body?;
    let request = body.into_order(idempotency_key(&headers))?;
    let result = state
        .gateway
        .create_order(ProviderKind::Card.as_str(), request)
        .await?;
    Ok(Json(result.into()))
}

/// POST /orders/crypto - Create a crypto-pay order
pub async fn create_crypto_order(
    State(state): State<PaymentsAppState>,
    headers: HeaderMap,
    body: Result<Json<CryptoOrderRequest>, JsonRejection>,
) -> Result<Json<CryptoOrderResponse>, PaymentsApiError> {
    let Json(body) = body?;
    let request = body.into_order(idempotency_key(&headers))?;
    let result = state
        .gateway
        .create_order(ProviderKind::Crypto.as_str(), request)
        .await?;
    Ok(Json(result.into()))
}

/// POST /orders/wallet - Create a wallet order awaiting payer approval
pub async fn create_wallet_order(
    State(state): State<PaymentsAppState>,
    headers: HeaderMap,
    body: Result<Json<WalletOrderRequest>, JsonRejection>,
) -> Result<Json<WalletOrderResponse>, PaymentsApiError> {
    let Json(body) = body?;
    let request = body.into_order(idempotency_key(&headers))?;
    let result = state
        .gateway
        .create_order(ProviderKind::Wallet.as_str(), request)
        .await?;
    Ok(Json(result.into()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhooks/card
pub async fn card_webhook(
    State(state): State<PaymentsAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    receive_webhook(&state, ProviderKind::Card, headers, body, "").await
}

/// POST /webhooks/crypto - The provider expects a literal `SUCCESS` body.
pub async fn crypto_webhook(
    State(state): State<PaymentsAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    receive_webhook(&state, ProviderKind::Crypto, headers, body, "SUCCESS").await
}

/// POST /webhooks/wallet
pub async fn wallet_webhook(
    State(state): State<PaymentsAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    receive_webhook(&state, ProviderKind::Wallet, headers, body, "").await
}

/// Rejections answer a bare 400; the reason is only logged.
async fn receive_webhook(
    state: &PaymentsAppState,
    provider: ProviderKind,
    headers: HeaderMap,
    body: Bytes,
    ack: &'static str,
) -> Response {
    match state
        .gateway
        .verify_webhook(provider.as_str(), body.to_vec(), headers)
        .await
    {
        Ok(WebhookDisposition::Verified(_)) => (StatusCode::OK, ack).into_response(),
        Ok(WebhookDisposition::Rejected { .. }) => StatusCode::BAD_REQUEST.into_response(),
        Err(err) => {
            tracing::warn!(provider = %provider, error = %err, "webhook not routable");
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Health
// ════════════════════════════════════════════════════════════════════════════════

/// GET /health
pub async fn health(State(state): State<PaymentsAppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        providers: state.gateway.providers(),
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts gateway errors to HTTP responses.
#[derive(Debug)]
pub struct PaymentsApiError(GatewayError);

impl From<GatewayError> for PaymentsApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for PaymentsApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(GatewayError::validation(rejection.body_text()))
    }
}

impl IntoResponse for PaymentsApiError {
    fn into_response(self) -> Response {
        // Every order failure is a 400; the envelope code tells them apart.
        (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(&self.0))).into_response()
    }
}
