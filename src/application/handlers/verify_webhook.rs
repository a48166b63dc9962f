//! VerifyWebhookHandler - Judges a webhook delivery and announces verified payments.

use std::sync::Arc;
use std::time::Duration;

use http::HeaderMap;

use crate::application::registry::ProviderRegistry;
use crate::domain::payment::{
    GatewayError, InboundWebhook, PaymentEvent, ProviderKind, WebhookDisposition,
};
use crate::ports::PaymentNotifier;

/// Command carrying one delivery exactly as received.
#[derive(Debug, Clone)]
pub struct VerifyWebhookCommand {
    /// Routing name (`card`, `crypto`, `wallet`).
    pub provider: String,
    pub body: Vec<u8>,
    pub headers: HeaderMap,
}

/// Handler for webhook verification.
pub struct VerifyWebhookHandler {
    registry: Arc<ProviderRegistry>,
    notifiers: Vec<Arc<dyn PaymentNotifier>>,
    timeout: Duration,
}

impl VerifyWebhookHandler {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        notifiers: Vec<Arc<dyn PaymentNotifier>>,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            notifiers,
            timeout,
        }
    }

    /// Returns the delivery's terminal state.
    ///
    /// Only an unknown routing name is an error; every other failure,
    /// including a provider that is not configured, rejects the delivery.
    pub async fn handle(&self, cmd: VerifyWebhookCommand) -> Result<WebhookDisposition, GatewayError> {
        let kind: ProviderKind = cmd.provider.parse()?;
        let inbound = InboundWebhook::received(kind, cmd.body, cmd.headers);

        let outcome = match self.registry.get(kind) {
            Ok(adapter) => {
                let verification = adapter.verify_webhook(inbound.body(), inbound.headers());
                match tokio::time::timeout(self.timeout, verification).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(GatewayError::timeout(kind, self.timeout.as_secs())),
                }
            }
            Err(err) => Err(err),
        };

        let disposition = inbound.resolve(outcome);
        match &disposition {
            WebhookDisposition::Verified(event) => {
                tracing::info!(
                    provider = %kind,
                    order_id = %event.external_order_id,
                    status = ?event.status,
                    "webhook verified"
                );
                self.dispatch(event);
            }
            WebhookDisposition::Rejected { reason } => {
                tracing::warn!(provider = %kind, reason = %reason, "webhook rejected");
            }
        }

        Ok(disposition)
    }

    /// Fire-and-forget: each channel runs on its own task, failures are logged.
    fn dispatch(&self, event: &PaymentEvent) {
        for notifier in &self.notifiers {
            let notifier = Arc::clone(notifier);
            let event = event.clone();
            tokio::spawn(async move {
                if let Err(err) = notifier.notify(&event).await {
                    tracing::warn!(
                        channel = notifier.channel(),
                        provider = %event.provider,
                        error = %err,
                        "payment notification failed"
                    );
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockPaymentProvider;
    use crate::domain::payment::PaymentStatus;
    use crate::ports::NotifyError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<PaymentEvent>>,
    }

    #[async_trait]
    impl PaymentNotifier for RecordingNotifier {
        fn channel(&self) -> &'static str {
            "recording"
        }

        async fn notify(&self, event: &PaymentEvent) -> Result<(), NotifyError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    fn handler(mock: MockPaymentProvider, notifier: Arc<RecordingNotifier>) -> VerifyWebhookHandler {
        VerifyWebhookHandler::new(
            Arc::new(ProviderRegistry::new().with_provider(Arc::new(mock))),
            vec![notifier as Arc<dyn PaymentNotifier>],
            Duration::from_secs(5),
        )
    }

    fn command(provider: &str) -> VerifyWebhookCommand {
        VerifyWebhookCommand {
            provider: provider.to_string(),
            body: br#"{"id":"evt_1"}"#.to_vec(),
            headers: HeaderMap::new(),
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn verified_event_is_dispatched() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mock = MockPaymentProvider::new(ProviderKind::Card)
            .accepting_webhooks("cs_1", PaymentStatus::Completed);

        let disposition = handler(mock, Arc::clone(&notifier))
            .handle(command("card"))
            .await
            .unwrap();
        settle().await;

        assert!(disposition.is_verified());
        let events = notifier.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].external_order_id, "cs_1");
    }

    #[tokio::test]
    async fn rejected_event_never_reaches_notifier() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mock = MockPaymentProvider::new(ProviderKind::Card);

        let disposition = handler(mock, Arc::clone(&notifier))
            .handle(command("card"))
            .await
            .unwrap();
        settle().await;

        assert!(!disposition.is_verified());
        assert!(notifier.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unregistered_provider_is_rejected() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mock = MockPaymentProvider::new(ProviderKind::Card)
            .accepting_webhooks("cs_1", PaymentStatus::Completed);

        let disposition = handler(mock, notifier).handle(command("wallet")).await.unwrap();
        assert!(!disposition.is_verified());
    }

    #[tokio::test]
    async fn unknown_routing_name_is_an_error() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mock = MockPaymentProvider::new(ProviderKind::Card);

        let err = handler(mock, notifier).handle(command("venmo")).await.unwrap_err();
        assert_eq!(err, GatewayError::UnknownProvider("venmo".to_string()));
    }
}
