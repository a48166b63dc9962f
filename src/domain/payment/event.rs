//! Normalized payment notification produced by webhook verification.

use serde::Serialize;

use super::provider::ProviderKind;

/// Payment status after provider-specific mapping.
///
/// Provider status strings that are not explicitly mapped become `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
    Failed,
    Pending,
    Unknown,
}

impl PaymentStatus {
    /// Only an explicit completion counts as paid.
    pub fn is_completed(&self) -> bool {
        matches!(self, PaymentStatus::Completed)
    }
}

/// A verified webhook notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentEvent {
    pub provider: ProviderKind,

    /// Always true for events handed out by the verifier.
    pub verified: bool,

    /// Provider-side order or session reference.
    pub external_order_id: String,

    /// Provider event type string as delivered.
    pub event_type: String,

    pub status: PaymentStatus,

    /// Body exactly as delivered.
    pub raw_payload: String,
}

impl PaymentEvent {
    pub fn verified(
        provider: ProviderKind,
        external_order_id: impl Into<String>,
        event_type: impl Into<String>,
        status: PaymentStatus,
        raw_payload: &[u8],
    ) -> Self {
        Self {
            provider,
            verified: true,
            external_order_id: external_order_id.into(),
            event_type: event_type.into(),
            status,
            raw_payload: String::from_utf8_lossy(raw_payload).into_owned(),
        }
    }
}
