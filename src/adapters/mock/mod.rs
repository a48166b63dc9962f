//! Mock payment provider for testing.
//!
//! Stands in for a real processor in gateway and HTTP tests.
//!
//! # Features
//!
//! - Configurable order outcome
//! - Simulated latency for timeout and single-flight testing
//! - Configurable webhook verdict
//! - Call counting for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockPaymentProvider::new(ProviderKind::Card)
//!     .with_redirect_url("https://checkout.example/cs_1")
//!     .with_delay(Duration::from_millis(100));
//!
//! let result = provider.create_order(request).await?;
//! assert_eq!(provider.order_calls(), 1);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use http::HeaderMap;

use crate::domain::payment::{
    GatewayError, OrderRequest, OrderResult, PaymentEvent, PaymentStatus, ProviderKind,
};
use crate::ports::PaymentProvider;

/// How the mock answers webhook deliveries.
#[derive(Debug, Clone)]
pub enum MockWebhook {
    /// Accept and emit an event with this order id and status.
    Accept { order_id: String, status: PaymentStatus },
    /// Reject every delivery with a signature failure.
    Reject,
}

/// Mock payment provider.
#[derive(Debug, Clone)]
pub struct MockPaymentProvider {
    kind: ProviderKind,
    redirect_url: Option<String>,
    /// Returned by every order call instead of a success.
    error: Option<GatewayError>,
    delay: Duration,
    webhook: MockWebhook,
    order_calls: Arc<AtomicUsize>,
    webhook_calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<OrderRequest>>>,
}

impl MockPaymentProvider {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            redirect_url: None,
            error: None,
            delay: Duration::ZERO,
            webhook: MockWebhook::Reject,
            order_calls: Arc::new(AtomicUsize::new(0)),
            webhook_calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    pub fn with_error(mut self, error: GatewayError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn accepting_webhooks(mut self, order_id: impl Into<String>, status: PaymentStatus) -> Self {
        self.webhook = MockWebhook::Accept {
            order_id: order_id.into(),
            status,
        };
        self
    }

    /// Number of `create_order` calls that reached the provider.
    pub fn order_calls(&self) -> usize {
        self.order_calls.load(Ordering::SeqCst)
    }

    pub fn webhook_calls(&self) -> usize {
        self.webhook_calls.load(Ordering::SeqCst)
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<OrderRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn create_order(&self, request: OrderRequest) -> Result<OrderResult, GatewayError> {
        let call = self.order_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(error) = &self.error {
            return Err(error.clone());
        }

        let order_id = format!("mock_{}_{}", self.kind, call);
        let raw = serde_json::json!({
            "id": order_id,
            "amount": request.amount.to_string(),
            "currency": request.currency,
            "description": request.description,
        });
        Ok(OrderResult::created(self.kind, order_id, self.redirect_url.clone(), raw))
    }

    async fn verify_webhook(&self, body: &[u8], _headers: &HeaderMap) -> Result<PaymentEvent, GatewayError> {
        self.webhook_calls.fetch_add(1, Ordering::SeqCst);
        match &self.webhook {
            MockWebhook::Accept { order_id, status } => Ok(PaymentEvent::verified(
                self.kind,
                order_id.clone(),
                "mock.event",
                *status,
                body,
            )),
            MockWebhook::Reject => Err(GatewayError::signature("mock rejects all deliveries")),
        }
    }
}
