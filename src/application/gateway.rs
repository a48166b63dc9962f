//! Payment gateway facade.
//!
//! Single entry point for the HTTP layer: provider lookup by name, the
//! caller-side timeout budget, idempotent order creation and webhook
//! verification with notification dispatch.

use std::sync::Arc;

use http::HeaderMap;

use crate::config::{AppConfig, GatewayConfig};
use crate::domain::payment::{GatewayError, OrderRequest, OrderResult, ProviderKind, WebhookDisposition};
use crate::ports::PaymentNotifier;

use super::handlers::{
    CreateOrderCommand, CreateOrderHandler, VerifyWebhookCommand, VerifyWebhookHandler,
};
use super::idempotency::IdempotencyTable;
use super::registry::ProviderRegistry;

/// The gateway. Cheap to share behind an `Arc`.
pub struct PaymentGateway {
    registry: Arc<ProviderRegistry>,
    create_order: CreateOrderHandler,
    verify_webhook: VerifyWebhookHandler,
}

impl PaymentGateway {
    pub fn new(
        registry: ProviderRegistry,
        notifiers: Vec<Arc<dyn PaymentNotifier>>,
        settings: &GatewayConfig,
    ) -> Self {
        let registry = Arc::new(registry);
        Self {
            create_order: CreateOrderHandler::new(
                Arc::clone(&registry),
                IdempotencyTable::new(settings.idempotency_ttl()),
                settings.timeout(),
                settings.default_product_name.clone(),
            ),
            verify_webhook: VerifyWebhookHandler::new(
                Arc::clone(&registry),
                notifiers,
                settings.timeout(),
            ),
            registry,
        }
    }

    /// Builds adapters for every configured provider.
    pub fn from_config(config: &AppConfig, notifiers: Vec<Arc<dyn PaymentNotifier>>) -> Self {
        Self::new(ProviderRegistry::from_config(config), notifiers, &config.gateway)
    }

    /// Creates an order with the named provider.
    ///
    /// Repeated calls with the same idempotency key share one provider order.
    pub async fn create_order(&self, provider: &str, request: OrderRequest) -> Result<OrderResult, GatewayError> {
        self.create_order
            .handle(CreateOrderCommand {
                provider: provider.to_string(),
                request,
            })
            .await
    }

    /// Verifies a delivery for the named provider.
    pub async fn verify_webhook(
        &self,
        provider: &str,
        body: impl Into<Vec<u8>>,
        headers: HeaderMap,
    ) -> Result<WebhookDisposition, GatewayError> {
        self.verify_webhook
            .handle(VerifyWebhookCommand {
                provider: provider.to_string(),
                body: body.into(),
                headers,
            })
            .await
    }

    /// Providers that can take orders.
    pub fn providers(&self) -> Vec<ProviderKind> {
        self.registry.available()
    }
}

