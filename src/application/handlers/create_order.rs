//! CreateOrderHandler - Routes an order to its provider exactly once per key.

use std::sync::Arc;
use std::time::Duration;

use crate::application::idempotency::{Flight, IdempotencyTable};
use crate::application::registry::ProviderRegistry;
use crate::domain::payment::{GatewayError, OrderRequest, OrderResult, ProviderKind};

/// Command to create a payment order.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    /// Routing name (`card`, `crypto`, `wallet`).
    pub provider: String,
    pub request: OrderRequest,
}

/// Handler for order creation.
pub struct CreateOrderHandler {
    registry: Arc<ProviderRegistry>,
    idempotency: IdempotencyTable,
    timeout: Duration,
    default_description: String,
}

impl CreateOrderHandler {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        idempotency: IdempotencyTable,
        timeout: Duration,
        default_description: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            idempotency,
            timeout,
            default_description: default_description.into(),
        }
    }

    pub async fn handle(&self, cmd: CreateOrderCommand) -> Result<OrderResult, GatewayError> {
        let CreateOrderCommand { provider, mut request } = cmd;

        // 1. Resolve the adapter
        let kind: ProviderKind = provider.parse()?;
        let adapter = self.registry.get(kind)?;
        if request.provider != kind {
            return Err(GatewayError::validation(format!(
                "request for {} sent to {}",
                request.provider, kind
            )));
        }

        // 2. Fill defaults and validate
        if request.description.trim().is_empty() {
            request.description = self.default_description.clone();
        }
        request.validate()?;

        // 3. Join or start the single flight for this key
        let idempotency_key = request.idempotency_key.clone();
        let (order, flight) = self.idempotency.run(kind, &idempotency_key, async move {
            adapter.create_order(request).await
        });
        if flight == Flight::Joined {
            tracing::info!(provider = %kind, idempotency_key = %idempotency_key, "joined existing order flight");
        }

        // 4. Bound the wait, not the upstream call
        match tokio::time::timeout(self.timeout, order).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(err)) => {
                tracing::warn!(
                    provider = %kind,
                    idempotency_key = %idempotency_key,
                    code = err.code(),
                    error = %err,
                    "order creation failed"
                );
                Err(err)
            }
            Err(_) => {
                tracing::warn!(
                    provider = %kind,
                    idempotency_key = %idempotency_key,
                    timeout_secs = self.timeout.as_secs(),
                    "order creation timed out"
                );
                Err(GatewayError::timeout(kind, self.timeout.as_secs()))
            }
        }
    }
}
