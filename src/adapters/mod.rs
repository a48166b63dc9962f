//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the gateway to external systems:
//! - `stripe` - Card processor (Stripe Checkout)
//! - `binance` - Crypto-pay processor (Binance Pay)
//! - `paypal` - Wallet processor (PayPal Orders)
//! - `notify` - Telegram, Twilio and log notification channels
//! - `mock` - In-memory provider for tests
//! - `http` - axum REST endpoints

pub mod binance;
pub mod http;
pub mod mock;
pub mod notify;
pub mod paypal;
pub mod stripe;

mod upstream;

pub use binance::{BinanceAdapter, BinanceConfig};
pub use mock::MockPaymentProvider;
pub use notify::{LogNotifier, TelegramNotifier, TwilioNotifier};
pub use paypal::{PayPalAdapter, PayPalConfig};
pub use stripe::{StripeAdapter, StripeConfig};
