//! Command handlers for the payment gateway.

mod create_order;
mod verify_webhook;

pub use create_order::{CreateOrderCommand, CreateOrderHandler};
pub use verify_webhook::{VerifyWebhookCommand, VerifyWebhookHandler};
