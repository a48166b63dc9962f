//! Card processor wire types.
//!
//! Only the fields the gateway reads are modelled; everything else stays in
//! the raw payload.

use serde::Deserialize;

// ════════════════════════════════════════════════════════════════════════════════
// API Responses
// ════════════════════════════════════════════════════════════════════════════════

/// Checkout Session returned by `POST /v1/checkout/sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Unique session identifier (cs_...).
    pub id: String,

    /// Hosted payment page; absent once the session is complete or expired.
    pub url: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Events
// ════════════════════════════════════════════════════════════════════════════════

/// Event envelope as delivered to the webhook endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeWebhookEvent {
    /// Unique event identifier (evt_...).
    pub id: String,

    /// Event type (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    pub data: StripeEventData,
}

/// Event data container.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    pub object: StripeEventObject,
}

/// The object an event is about: a checkout session or a payment intent.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventObject {
    pub id: String,

    /// Checkout sessions only: `paid`, `unpaid` or `no_payment_required`.
    pub payment_status: Option<String>,
}
