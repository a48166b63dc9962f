//! Inbound webhook lifecycle: `Received -> {Verified, Rejected}`.
//!
//! An [`InboundWebhook`] captures the body and headers exactly as delivered.
//! [`InboundWebhook::resolve`] consumes it, so each delivery transitions once.

use http::HeaderMap;

use super::errors::GatewayError;
use super::event::PaymentEvent;
use super::provider::ProviderKind;

/// A webhook delivery that has been received but not yet judged.
#[derive(Debug)]
pub struct InboundWebhook {
    provider: ProviderKind,
    body: Vec<u8>,
    headers: HeaderMap,
}

/// Terminal state of a webhook delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookDisposition {
    /// Authentic; may be handed to downstream collaborators.
    Verified(PaymentEvent),

    /// Not authentic or not decodable. Must not trigger side effects.
    Rejected { reason: String },
}

impl InboundWebhook {
    pub fn received(provider: ProviderKind, body: impl Into<Vec<u8>>, headers: HeaderMap) -> Self {
        Self {
            provider,
            body: body.into(),
            headers,
        }
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Raw body bytes; signatures are computed over these, never over a re-serialization.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Applies the verification outcome. Any error, or an event that does
    /// not claim to be verified for this provider, rejects the delivery.
    pub fn resolve(self, outcome: Result<PaymentEvent, GatewayError>) -> WebhookDisposition {
        match outcome {
            Ok(event) if event.verified && event.provider == self.provider => {
                WebhookDisposition::Verified(event)
            }
            Ok(event) => WebhookDisposition::Rejected {
                reason: format!(
                    "event for {} was not marked verified by the {} verifier",
                    event.provider, self.provider
                ),
            },
            Err(err) => WebhookDisposition::Rejected {
                reason: err.to_string(),
            },
        }
    }
}

impl WebhookDisposition {
    pub fn is_verified(&self) -> bool {
        matches!(self, WebhookDisposition::Verified(_))
    }
}
