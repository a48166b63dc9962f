//! HTTP adapter for the payment gateway.
//!
//! Exposes order creation, webhook delivery and health endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::*;
pub use handlers::{PaymentsApiError, PaymentsAppState, IDEMPOTENCY_KEY_HEADER};
pub use routes::{order_routes, payments_router, webhook_routes};
