//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PAYBRIDGE` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use paybridge::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod credentials;
mod error;
mod gateway;
mod notify;
mod payment;
mod server;

pub use credentials::{
    CardCredentials, CredentialStore, CryptoCredentials, ProviderCredentials, WalletCredentials,
};
pub use error::{ConfigError, ValidationError};
pub use gateway::GatewayConfig;
pub use notify::{NotifyConfig, TelegramSettings, TwilioSettings};
pub use payment::{CardConfig, CryptoConfig, WalletConfig};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment loads; providers
/// without credentials are simply unavailable at runtime.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Timeouts, idempotency retention and naming defaults
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Card processor (Stripe)
    #[serde(default)]
    pub card: CardConfig,

    /// Crypto-pay processor (Binance Pay)
    #[serde(default)]
    pub crypto: CryptoConfig,

    /// Wallet processor (PayPal)
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Outbound payment notifications (Telegram, Twilio)
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PAYBRIDGE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PAYBRIDGE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PAYBRIDGE__CARD__SECRET_KEY=...` -> `card.secret_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PAYBRIDGE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Performs semantic validation of configuration:
    /// - Port and timeout ranges
    /// - Card key prefixes when present
    /// - Production-specific requirements (HTTPS provider URLs)
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let production = self.is_production();
        self.server.validate()?;
        self.gateway.validate()?;
        self.card.validate(production)?;
        self.crypto.validate(production)?;
        self.wallet.validate(production)?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }

    /// Credential lookup built from the provider sections.
    pub fn credentials(&self) -> CredentialStore {
        CredentialStore::new(&self.card, &self.crypto, &self.wallet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::ProviderKind;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "PAYBRIDGE__SERVER__PORT",
        "PAYBRIDGE__SERVER__ENVIRONMENT",
        "PAYBRIDGE__GATEWAY__TIMEOUT_SECS",
        "PAYBRIDGE__CARD__SECRET_KEY",
        "PAYBRIDGE__CARD__WEBHOOK_SECRET",
        "PAYBRIDGE__CRYPTO__SECRET_KEY",
        "PAYBRIDGE__CRYPTO__CERTIFICATE_SN",
        "PAYBRIDGE__WALLET__CLIENT_ID",
        "PAYBRIDGE__WALLET__CLIENT_SECRET",
        "PAYBRIDGE__WALLET__BASE_URL",
    ];

    fn set_card_env() {
        env::set_var("PAYBRIDGE__CARD__SECRET_KEY", "sk_test_xxx");
        env::set_var("PAYBRIDGE__CARD__WEBHOOK_SECRET", "whsec_xxx");
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_card_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(
            config.card.secret_key.unwrap().expose_secret(),
            "sk_test_xxx"
        );
    }

    #[test]
    fn test_empty_environment_loads_with_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.gateway.timeout_secs, 25);
        assert_eq!(config.card.base_url, "https://api.stripe.com");
        assert!(config.validate().is_ok());
        assert!(config.credentials().configured().is_empty());
    }

    #[test]
    fn test_partial_credentials_only_disable_one_provider() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_card_env();
        env::set_var("PAYBRIDGE__WALLET__CLIENT_ID", "client");
        let result = AppConfig::load();
        clear_env();

        let store = result.unwrap().credentials();
        assert_eq!(store.configured(), vec![ProviderKind::Card]);
        assert!(store.wallet().is_err());
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PAYBRIDGE__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_production_requires_https_provider_urls() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PAYBRIDGE__SERVER__ENVIRONMENT", "production");
        env::set_var("PAYBRIDGE__WALLET__BASE_URL", "http://localhost:9000");
        let result = AppConfig::load();
        clear_env();

        assert_eq!(
            result.unwrap().validate(),
            Err(ValidationError::BaseUrlMustBeHttps("wallet"))
        );
    }

    #[test]
    fn test_custom_numeric_values() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PAYBRIDGE__SERVER__PORT", "3000");
        env::set_var("PAYBRIDGE__GATEWAY__TIMEOUT_SECS", "10");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.gateway.timeout_secs, 10);
    }
}
