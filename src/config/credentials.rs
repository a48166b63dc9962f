//! Credential store.
//!
//! Built once from [`AppConfig`](super::AppConfig) at startup and read-only
//! afterwards. Lookups for a provider whose required fields are absent fail
//! with a configuration error naming the first missing field.

use secrecy::{ExposeSecret, SecretString};

use crate::domain::payment::{GatewayError, ProviderKind};

use super::payment::{CardConfig, CryptoConfig, WalletConfig};

/// Card processor credentials.
#[derive(Debug, Clone)]
pub struct CardCredentials {
    pub secret_key: SecretString,
    /// Only needed to verify webhooks.
    pub webhook_secret: Option<SecretString>,
}

/// Crypto-pay credentials.
#[derive(Debug, Clone)]
pub struct CryptoCredentials {
    pub secret_key: SecretString,
    pub certificate_sn: String,
    pub merchant_id: Option<String>,
}

/// Wallet OAuth client credentials.
#[derive(Debug, Clone)]
pub struct WalletCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
    /// Only needed to verify webhooks.
    pub webhook_id: Option<String>,
}

/// Secret material for one provider.
#[derive(Debug, Clone)]
pub enum ProviderCredentials {
    Card(CardCredentials),
    Crypto(CryptoCredentials),
    Wallet(WalletCredentials),
}

impl ProviderCredentials {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderCredentials::Card(_) => ProviderKind::Card,
            ProviderCredentials::Crypto(_) => ProviderKind::Crypto,
            ProviderCredentials::Wallet(_) => ProviderKind::Wallet,
        }
    }
}

/// Immutable per-provider credential lookup.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    card: Result<CardCredentials, GatewayError>,
    crypto: Result<CryptoCredentials, GatewayError>,
    wallet: Result<WalletCredentials, GatewayError>,
}

impl CredentialStore {
    pub fn new(card: &CardConfig, crypto: &CryptoConfig, wallet: &WalletConfig) -> Self {
        Self {
            card: card_credentials(card),
            crypto: crypto_credentials(crypto),
            wallet: wallet_credentials(wallet),
        }
    }

    pub fn get(&self, provider: ProviderKind) -> Result<ProviderCredentials, GatewayError> {
        match provider {
            ProviderKind::Card => self.card().map(ProviderCredentials::Card),
            ProviderKind::Crypto => self.crypto().map(ProviderCredentials::Crypto),
            ProviderKind::Wallet => self.wallet().map(ProviderCredentials::Wallet),
        }
    }

    pub fn card(&self) -> Result<CardCredentials, GatewayError> {
        self.card.clone()
    }

    pub fn crypto(&self) -> Result<CryptoCredentials, GatewayError> {
        self.crypto.clone()
    }

    pub fn wallet(&self) -> Result<WalletCredentials, GatewayError> {
        self.wallet.clone()
    }

    /// Providers with complete credentials.
    pub fn configured(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind).is_ok())
            .collect()
    }
}

fn card_credentials(config: &CardConfig) -> Result<CardCredentials, GatewayError> {
    Ok(CardCredentials {
        secret_key: required_secret(ProviderKind::Card, &config.secret_key, "secret_key")?,
        webhook_secret: optional_secret(&config.webhook_secret),
    })
}

fn crypto_credentials(config: &CryptoConfig) -> Result<CryptoCredentials, GatewayError> {
    Ok(CryptoCredentials {
        secret_key: required_secret(ProviderKind::Crypto, &config.secret_key, "secret_key")?,
        certificate_sn: required(ProviderKind::Crypto, &config.certificate_sn, "certificate_sn")?,
        merchant_id: optional(&config.merchant_id),
    })
}

fn wallet_credentials(config: &WalletConfig) -> Result<WalletCredentials, GatewayError> {
    Ok(WalletCredentials {
        client_id: required(ProviderKind::Wallet, &config.client_id, "client_id")?,
        client_secret: required_secret(ProviderKind::Wallet, &config.client_secret, "client_secret")?,
        webhook_id: optional(&config.webhook_id),
    })
}

fn required(
    provider: ProviderKind,
    value: &Option<String>,
    field: &'static str,
) -> Result<String, GatewayError> {
    optional(value).ok_or_else(|| GatewayError::configuration(provider, field))
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_secret(
    provider: ProviderKind,
    value: &Option<SecretString>,
    field: &'static str,
) -> Result<SecretString, GatewayError> {
    optional_secret(value).ok_or_else(|| GatewayError::configuration(provider, field))
}

fn optional_secret(value: &Option<SecretString>) -> Option<SecretString> {
    value
        .as_ref()
        .filter(|s| !s.expose_secret().trim().is_empty())
        .cloned()
}
