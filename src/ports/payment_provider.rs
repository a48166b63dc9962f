//! Payment provider port.
//!
//! One implementation per provider. Adapters build the provider payload,
//! sign it when the provider requires it, call the provider and normalize
//! the outcome. Library and network failures are converted to
//! [`GatewayError`] inside the adapter; nothing provider-shaped leaks except
//! `OrderResult::raw_provider_payload`.

use async_trait::async_trait;
use http::HeaderMap;

use crate::domain::payment::{GatewayError, OrderRequest, OrderResult, PaymentEvent, ProviderKind};

/// Port for payment provider integrations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Provider this adapter talks to.
    fn kind(&self) -> ProviderKind;

    /// Create a payment order and return where to send the payer.
    ///
    /// The request's idempotency key is forwarded to providers that accept one.
    async fn create_order(&self, request: OrderRequest) -> Result<OrderResult, GatewayError>;

    /// Verify an inbound notification and decode it.
    ///
    /// `body` must be the bytes exactly as delivered. Any authenticity
    /// failure is a `SignatureVerification` error.
    async fn verify_webhook(&self, body: &[u8], headers: &HeaderMap) -> Result<PaymentEvent, GatewayError>;
}
