//! Per-provider payment configuration
//!
//! Every field is optional at load time. Missing credentials only disable the
//! affected provider; see [`super::CredentialStore`].

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Card processor (Stripe Checkout)
#[derive(Debug, Clone, Deserialize)]
pub struct CardConfig {
    /// Secret API key (sk_live_... or sk_test_...)
    pub secret_key: Option<SecretString>,

    /// Webhook signing secret (whsec_...)
    pub webhook_secret: Option<SecretString>,

    #[serde(default = "default_card_base_url")]
    pub base_url: String,
}

/// Crypto-pay processor (Binance Pay)
#[derive(Debug, Clone, Deserialize)]
pub struct CryptoConfig {
    /// HMAC-SHA512 request signing secret
    pub secret_key: Option<SecretString>,

    /// API key identifier sent as `BinancePay-Certificate-SN`
    pub certificate_sn: Option<String>,

    pub merchant_id: Option<String>,

    #[serde(default = "default_crypto_base_url")]
    pub base_url: String,

    /// Where the provider posts payment notifications
    pub webhook_url: Option<String>,
}

/// Wallet processor (PayPal Orders v2)
#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    pub client_id: Option<String>,

    pub client_secret: Option<SecretString>,

    /// Sandbox by default; production deployments override it
    #[serde(default = "default_wallet_base_url")]
    pub base_url: String,

    /// Webhook registration id used by remote signature verification
    pub webhook_id: Option<String>,
}

impl CardConfig {
    /// Check if using test mode keys
    pub fn is_test_mode(&self) -> bool {
        exposed(&self.secret_key).is_some_and(|k| k.starts_with("sk_test_"))
    }

    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        // Verify key prefixes for safety
        if exposed(&self.secret_key).is_some_and(|k| !k.starts_with("sk_")) {
            return Err(ValidationError::InvalidCardKey);
        }
        if exposed(&self.webhook_secret).is_some_and(|k| !k.starts_with("whsec_")) {
            return Err(ValidationError::InvalidCardWebhookSecret);
        }
        validate_base_url("card", &self.base_url, production)
    }
}

impl CryptoConfig {
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        validate_base_url("crypto", &self.base_url, production)
    }
}

impl WalletConfig {
    pub fn is_sandbox(&self) -> bool {
        self.base_url.contains("sandbox")
    }

    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        validate_base_url("wallet", &self.base_url, production)
    }
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            webhook_secret: None,
            base_url: default_card_base_url(),
        }
    }
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            certificate_sn: None,
            merchant_id: None,
            base_url: default_crypto_base_url(),
            webhook_url: None,
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            base_url: default_wallet_base_url(),
            webhook_id: None,
        }
    }
}

/// Present and non-empty secret value.
fn exposed(secret: &Option<SecretString>) -> Option<&str> {
    secret
        .as_ref()
        .map(|s| s.expose_secret().as_str())
        .filter(|s| !s.is_empty())
}

fn validate_base_url(provider: &'static str, url: &str, production: bool) -> Result<(), ValidationError> {
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(ValidationError::InvalidBaseUrl(provider));
    }
    if production && !url.starts_with("https://") {
        return Err(ValidationError::BaseUrlMustBeHttps(provider));
    }
    Ok(())
}

fn default_card_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_crypto_base_url() -> String {
    "https://bpay.binanceapi.com".to_string()
}

fn default_wallet_base_url() -> String {
    "https://api-m.sandbox.paypal.com".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> Option<SecretString> {
        Some(SecretString::new(value.to_string()))
    }

    #[test]
    fn test_is_test_mode() {
        let config = CardConfig {
            secret_key: secret("sk_test_xxx"),
            ..Default::default()
        };
        assert!(config.is_test_mode());

        let config = CardConfig {
            secret_key: secret("sk_live_xxx"),
            ..Default::default()
        };
        assert!(!config.is_test_mode());
    }

    #[test]
    fn test_absent_card_credentials_are_valid() {
        assert!(CardConfig::default().validate(true).is_ok());
    }

    #[test]
    fn test_validation_invalid_api_key_prefix() {
        let config = CardConfig {
            secret_key: secret("pk_test_xxx"),
            ..Default::default()
        };
        assert_eq!(config.validate(false), Err(ValidationError::InvalidCardKey));
    }

    #[test]
    fn test_validation_invalid_webhook_secret_prefix() {
        let config = CardConfig {
            secret_key: secret("sk_test_xxx"),
            webhook_secret: secret("secret_xxx"),
            ..Default::default()
        };
        assert_eq!(
            config.validate(false),
            Err(ValidationError::InvalidCardWebhookSecret)
        );
    }

    #[test]
    fn test_plain_http_only_outside_production() {
        let config = WalletConfig {
            base_url: "http://localhost:9000".to_string(),
            ..Default::default()
        };
        assert!(config.validate(false).is_ok());
        assert_eq!(
            config.validate(true),
            Err(ValidationError::BaseUrlMustBeHttps("wallet"))
        );
    }

    #[test]
    fn test_garbage_base_url() {
        let config = CryptoConfig {
            base_url: "bpay.binanceapi.com".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(false), Err(ValidationError::InvalidBaseUrl("crypto")));
    }

    #[test]
    fn test_wallet_defaults_to_sandbox() {
        assert!(WalletConfig::default().is_sandbox());
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let config = CardConfig {
            secret_key: secret("sk_live_very_secret"),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("very_secret"));
    }
}
