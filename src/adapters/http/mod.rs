//! HTTP adapters - REST API implementations.

pub mod payments;

pub use payments::{payments_router, PaymentsAppState};

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::application::PaymentGateway;

/// Full application router with request tracing and a server-side timeout.
pub fn app(gateway: Arc<PaymentGateway>, request_timeout: Duration) -> Router {
    payments_router()
        .with_state(PaymentsAppState::new(gateway))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout)),
        )
}
