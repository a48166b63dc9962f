//! Logging fallback channel.

use async_trait::async_trait;

use crate::domain::payment::PaymentEvent;
use crate::ports::{NotifyError, PaymentNotifier};

/// Writes verified events to the log instead of an external channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl PaymentNotifier for LogNotifier {
    fn channel(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, event: &PaymentEvent) -> Result<(), NotifyError> {
        tracing::info!(
            provider = %event.provider,
            order_id = %event.external_order_id,
            event_type = %event.event_type,
            status = ?event.status,
            "payment event"
        );
        Ok(())
    }
}
