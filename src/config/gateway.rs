//! Gateway behaviour configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Timeouts, retention and naming defaults shared by all providers.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// How long a caller waits for an order before giving up
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Per-request timeout of the provider HTTP clients
    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,

    /// Retention of successful results per idempotency key
    #[serde(default = "default_idempotency_ttl")]
    pub idempotency_ttl_secs: u64,

    /// Maximum age of a signed webhook
    #[serde(default = "default_replay_tolerance")]
    pub replay_tolerance_secs: u64,

    /// Product or goods name used when a caller supplies none
    #[serde(default = "default_product_name")]
    pub default_product_name: String,

    /// Prefix of crypto merchant trade references
    #[serde(default = "default_trade_no_prefix")]
    pub trade_no_prefix: String,
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn idempotency_ttl(&self) -> Duration {
        Duration::from_secs(self.idempotency_ttl_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=300).contains(&self.timeout_secs) {
            return Err(ValidationError::InvalidGatewayTimeout);
        }
        if !(1..=300).contains(&self.upstream_timeout_secs) {
            return Err(ValidationError::InvalidUpstreamTimeout);
        }
        if self.idempotency_ttl_secs == 0 {
            return Err(ValidationError::InvalidIdempotencyTtl);
        }
        if !(1..=3600).contains(&self.replay_tolerance_secs) {
            return Err(ValidationError::InvalidReplayTolerance);
        }

        let prefix_ok = (1..=6).contains(&self.trade_no_prefix.len())
            && self.trade_no_prefix.chars().all(|c| c.is_ascii_alphanumeric());
        if !prefix_ok {
            return Err(ValidationError::InvalidTradeNoPrefix);
        }
        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            upstream_timeout_secs: default_upstream_timeout(),
            idempotency_ttl_secs: default_idempotency_ttl(),
            replay_tolerance_secs: default_replay_tolerance(),
            default_product_name: default_product_name(),
            trade_no_prefix: default_trade_no_prefix(),
        }
    }
}

fn default_timeout() -> u64 {
    25
}

fn default_upstream_timeout() -> u64 {
    20
}

fn default_idempotency_ttl() -> u64 {
    24 * 60 * 60
}

fn default_replay_tolerance() -> u64 {
    300
}

fn default_product_name() -> String {
    "MANY Pro".to_string()
}

fn default_trade_no_prefix() -> String {
    "MANY".to_string()
}
