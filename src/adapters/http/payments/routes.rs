//! Axum router configuration for payment endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    card_webhook, create_card_order, create_crypto_order, create_wallet_order, crypto_webhook,
    health, wallet_webhook, PaymentsAppState,
};

/// Order creation routes.
///
/// # Routes
/// - `POST /card` - Hosted card checkout
/// - `POST /crypto` - Crypto-pay order
/// - `POST /wallet` - Wallet order
pub fn order_routes() -> Router<PaymentsAppState> {
    Router::new()
        .route("/card", post(create_card_order))
        .route("/crypto", post(create_crypto_order))
        .route("/wallet", post(create_wallet_order))
}

/// Webhook routes (no auth, signature verified).
///
/// # Routes
/// - `POST /card`
/// - `POST /crypto`
/// - `POST /wallet`
pub fn webhook_routes() -> Router<PaymentsAppState> {
    Router::new()
        .route("/card", post(card_webhook))
        .route("/crypto", post(crypto_webhook))
        .route("/wallet", post(wallet_webhook))
}

/// Complete payments router, mounted at the root.
///
/// ```ignore
/// let app = payments_router().with_state(PaymentsAppState::new(gateway));
/// ```
pub fn payments_router() -> Router<PaymentsAppState> {
    Router::new()
        .nest("/orders", order_routes())
        .nest("/webhooks", webhook_routes())
        .route("/health", get(health))
}
