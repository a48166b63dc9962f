//! Outbound payment notification port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::payment::PaymentEvent;

/// Delivery failure of a notification channel. Never retried.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("{channel} request failed: {message}")]
    Transport { channel: &'static str, message: String },

    #[error("{channel} rejected the message with status {status}: {body}")]
    Rejected {
        channel: &'static str,
        status: u16,
        body: String,
    },
}

/// Announces verified payment events to a human-facing channel.
///
/// Only called with events whose webhook was verified.
#[async_trait]
pub trait PaymentNotifier: Send + Sync {
    /// Channel name for logs.
    fn channel(&self) -> &'static str;

    async fn notify(&self, event: &PaymentEvent) -> Result<(), NotifyError>;
}
