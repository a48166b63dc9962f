//! Payment domain - provider-neutral orders, events and errors.

mod errors;
mod event;
mod money;
mod order;
mod provider;
mod trade_ref;
mod webhook;

pub use errors::{ErrorEnvelope, GatewayError};
pub use event::{PaymentEvent, PaymentStatus};
pub use money::{currency_exponent, ensure_positive, to_minor_units};
pub use order::{OrderRequest, OrderResult};
pub use provider::ProviderKind;
pub use trade_ref::{merchant_trade_no, nonce, MAX_TRADE_NO_LEN};
pub use webhook::{InboundWebhook, WebhookDisposition};
