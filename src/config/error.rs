//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("Gateway timeout must be between 1 and 300 seconds")]
    InvalidGatewayTimeout,

    #[error("Upstream timeout must be between 1 and 300 seconds")]
    InvalidUpstreamTimeout,

    #[error("Idempotency retention must be positive")]
    InvalidIdempotencyTtl,

    #[error("Replay tolerance must be between 1 and 3600 seconds")]
    InvalidReplayTolerance,

    #[error("Trade reference prefix must be 1-6 letters or digits")]
    InvalidTradeNoPrefix,

    #[error("Invalid card secret key format")]
    InvalidCardKey,

    #[error("Invalid card webhook secret format")]
    InvalidCardWebhookSecret,

    #[error("{0} base URL must use HTTPS in production")]
    BaseUrlMustBeHttps(&'static str),

    #[error("Invalid {0} base URL")]
    InvalidBaseUrl(&'static str),
}
