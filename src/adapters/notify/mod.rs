//! Notification channels for verified payment events.
//!
//! - `TelegramNotifier` - Bot API `sendMessage`
//! - `TwilioNotifier` - Messages API SMS
//! - `LogNotifier` - structured log line, used when no channel is configured

mod log_notifier;
mod telegram;
mod twilio;

pub use log_notifier::LogNotifier;
pub use telegram::TelegramNotifier;
pub use twilio::TwilioNotifier;

use std::sync::Arc;
use std::time::Duration;

use crate::config::NotifyConfig;
use crate::domain::payment::PaymentEvent;
use crate::ports::{NotifyError, PaymentNotifier};

/// Outbound requests to chat and SMS APIs give up after this long.
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Human-readable one-liner shared by all channels.
pub fn message_text(event: &PaymentEvent) -> String {
    format!(
        "Payment {:?} via {}: order {} ({})",
        event.status, event.provider, event.external_order_id, event.event_type
    )
}

/// Builds every channel enabled in `config`, or the log fallback if none is.
pub fn from_config(config: &NotifyConfig) -> Result<Vec<Arc<dyn PaymentNotifier>>, NotifyError> {
    let mut notifiers: Vec<Arc<dyn PaymentNotifier>> = Vec::new();

    if let Some(settings) = config.telegram() {
        notifiers.push(Arc::new(TelegramNotifier::new(settings)?));
    }
    if let Some(settings) = config.twilio() {
        notifiers.push(Arc::new(TwilioNotifier::new(settings)?));
    }
    if notifiers.is_empty() {
        notifiers.push(Arc::new(LogNotifier));
    }

    Ok(notifiers)
}

fn http_client(channel: &'static str) -> Result<reqwest::Client, NotifyError> {
    reqwest::Client::builder()
        .timeout(NOTIFY_TIMEOUT)
        .build()
        .map_err(|e| NotifyError::Transport {
            channel,
            message: e.to_string(),
        })
}

async fn check_response(channel: &'static str, response: reqwest::Response) -> Result<(), NotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(NotifyError::Rejected {
        channel,
        status: status.as_u16(),
        body,
    })
}
