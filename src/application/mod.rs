//! Application layer - Gateway facade, handlers and in-process state.
//!
//! Orchestrates the provider adapters behind a single facade:
//! - `ProviderRegistry` - routing name to adapter
//! - `IdempotencyTable` - single-flight order creation per key
//! - `handlers` - create-order and verify-webhook commands
//! - `PaymentGateway` - the facade the HTTP layer talks to

pub mod handlers;
mod gateway;
mod idempotency;
mod registry;

pub use gateway::PaymentGateway;
pub use handlers::{CreateOrderCommand, CreateOrderHandler, VerifyWebhookCommand, VerifyWebhookHandler};
pub use idempotency::{Flight, IdempotencyTable, SharedOrder};
pub use registry::ProviderRegistry;
