//! Wallet payment adapter (PayPal Orders v2).
//!
//! # Configuration
//!
//! - `PAYBRIDGE__WALLET__CLIENT_ID` / `PAYBRIDGE__WALLET__CLIENT_SECRET`
//! - `PAYBRIDGE__WALLET__BASE_URL`: sandbox unless overridden
//! - `PAYBRIDGE__WALLET__WEBHOOK_ID`: required to verify webhooks

mod paypal_adapter;
mod token_cache;
mod types;

pub use paypal_adapter::{
    map_status, PayPalAdapter, PayPalConfig, AUTH_ALGO_HEADER, CERT_URL_HEADER,
    TRANSMISSION_ID_HEADER, TRANSMISSION_SIG_HEADER, TRANSMISSION_TIME_HEADER,
};
pub use token_cache::{TokenCache, EARLY_EXPIRY};
pub use types::{CreateOrderBody, Order, WebhookEvent};
