//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentProvider` - Order creation and webhook verification per provider
//! - `PaymentNotifier` - Fire-and-forget announcement of verified payments

mod payment_notifier;
mod payment_provider;

pub use payment_notifier::{NotifyError, PaymentNotifier};
pub use payment_provider::PaymentProvider;
