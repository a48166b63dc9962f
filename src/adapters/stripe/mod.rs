//! Card payment adapter (Stripe Checkout).
//!
//! Implements the `PaymentProvider` port for the card processor:
//! - One-off Checkout Sessions with caller idempotency keys
//! - Webhook signature verification and status mapping
//!
//! # Configuration
//!
//! - `PAYBRIDGE__CARD__SECRET_KEY`: secret API key
//! - `PAYBRIDGE__CARD__WEBHOOK_SECRET`: webhook signing secret (whsec_...)

mod stripe_adapter;
mod webhook_types;

pub use stripe_adapter::{map_status, StripeAdapter, StripeConfig};
pub use webhook_types::{CheckoutSession, StripeEventData, StripeEventObject, StripeWebhookEvent};
