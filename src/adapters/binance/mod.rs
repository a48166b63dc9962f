//! Crypto payment adapter (Binance Pay).
//!
//! - HMAC-SHA512 signed order creation
//! - RSA-SHA256 notification verification against cached provider certificates
//!
//! # Configuration
//!
//! - `PAYBRIDGE__CRYPTO__SECRET_KEY`: request signing secret
//! - `PAYBRIDGE__CRYPTO__CERTIFICATE_SN`: API key identifier
//! - `PAYBRIDGE__CRYPTO__MERCHANT_ID` (optional)
//! - `PAYBRIDGE__CRYPTO__WEBHOOK_URL`: notification URL sent with each order

mod binance_adapter;
mod certificate_cache;
mod types;

pub use binance_adapter::{map_status, BinanceAdapter, BinanceConfig};
pub use certificate_cache::{CertificateCache, KeyLookup};
pub use types::{ApiResponse, CreateOrderBody, OrderData, WebhookNotification};
