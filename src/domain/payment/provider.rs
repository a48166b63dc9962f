//! The closed set of payment providers the gateway can route to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::GatewayError;

/// Payment provider kind.
///
/// Adding a provider means adding a variant here, an adapter implementing
/// `PaymentProvider`, and its case in the signature engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Card processor (Stripe Checkout).
    Card,

    /// Crypto-pay processor (Binance Pay).
    Crypto,

    /// Wallet processor (PayPal Orders).
    Wallet,
}

impl ProviderKind {
    /// Every supported provider, in routing order.
    pub const ALL: [ProviderKind; 3] = [ProviderKind::Card, ProviderKind::Crypto, ProviderKind::Wallet];

    /// Routing name used in URLs and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Card => "card",
            ProviderKind::Crypto => "crypto",
            ProviderKind::Wallet => "wallet",
        }
    }

    /// Whether webhooks from this provider carry a signed timestamp that must
    /// fall inside the replay window.
    pub fn has_replay_window(&self) -> bool {
        matches!(self, ProviderKind::Card | ProviderKind::Crypto)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(ProviderKind::Card),
            "crypto" => Ok(ProviderKind::Crypto),
            "wallet" => Ok(ProviderKind::Wallet),
            other => Err(GatewayError::UnknownProvider(other.to_string())),
        }
    }
}
