//! Provider registry: routing name to adapter.

use std::collections::HashMap;
use std::sync::Arc;

use crate::adapters::binance::{BinanceAdapter, BinanceConfig};
use crate::adapters::paypal::{PayPalAdapter, PayPalConfig};
use crate::adapters::stripe::{StripeAdapter, StripeConfig};
use crate::config::AppConfig;
use crate::domain::payment::{GatewayError, ProviderKind};
use crate::domain::signature::ReplayWindow;
use crate::ports::PaymentProvider;

/// Registered adapters, plus the reason each missing provider is unavailable.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn PaymentProvider>>,
    unavailable: HashMap<ProviderKind, GatewayError>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds one adapter per provider with complete credentials.
    ///
    /// Providers that cannot be built are recorded with their error, so a
    /// lookup explains what is missing instead of reporting an unknown name.
    pub fn from_config(config: &AppConfig) -> Self {
        let credentials = config.credentials();
        let gateway = &config.gateway;
        let window = ReplayWindow::with_max_age(gateway.replay_tolerance_secs as i64);
        let mut registry = Self::new();

        let card = credentials.card().and_then(|creds| {
            StripeAdapter::new(
                StripeConfig::new(creds)
                    .with_base_url(config.card.base_url.clone())
                    .with_timeout(gateway.upstream_timeout())
                    .with_replay_window(window),
            )
        });
        registry.register_result(ProviderKind::Card, card);

        let crypto = credentials.crypto().and_then(|creds| {
            BinanceAdapter::new(
                BinanceConfig::new(creds)
                    .with_base_url(config.crypto.base_url.clone())
                    .with_notify_url(config.crypto.webhook_url.clone())
                    .with_trade_no_prefix(gateway.trade_no_prefix.clone())
                    .with_timeout(gateway.upstream_timeout())
                    .with_replay_window(window),
            )
        });
        registry.register_result(ProviderKind::Crypto, crypto);

        let wallet = credentials.wallet().and_then(|creds| {
            PayPalAdapter::new(
                PayPalConfig::new(creds)
                    .with_base_url(config.wallet.base_url.clone())
                    .with_timeout(gateway.upstream_timeout())
                    .with_replay_window(window),
            )
        });
        registry.register_result(ProviderKind::Wallet, wallet);

        registry
    }

    fn register_result<P>(&mut self, kind: ProviderKind, adapter: Result<P, GatewayError>)
    where
        P: PaymentProvider + 'static,
    {
        match adapter {
            Ok(adapter) => {
                tracing::info!(provider = %kind, "payment provider enabled");
                self.register(Arc::new(adapter));
            }
            Err(err) => {
                tracing::warn!(provider = %kind, error = %err, "payment provider disabled");
                self.unavailable.insert(kind, err);
            }
        }
    }

    /// Adds or replaces the adapter for its provider kind.
    pub fn register(&mut self, provider: Arc<dyn PaymentProvider>) {
        let kind = provider.kind();
        self.unavailable.remove(&kind);
        self.providers.insert(kind, provider);
    }

    pub fn with_provider(mut self, provider: Arc<dyn PaymentProvider>) -> Self {
        self.register(provider);
        self
    }

    /// Looks up the adapter for `kind`.
    pub fn get(&self, kind: ProviderKind) -> Result<Arc<dyn PaymentProvider>, GatewayError> {
        if let Some(provider) = self.providers.get(&kind) {
            return Ok(Arc::clone(provider));
        }
        Err(self
            .unavailable
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| GatewayError::UnknownProvider(kind.to_string())))
    }

    /// Parses a routing name and looks up its adapter.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn PaymentProvider>, GatewayError> {
        self.get(name.parse()?)
    }

    /// Registered providers in routing order.
    pub fn available(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.providers.contains_key(kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockPaymentProvider;
    use secrecy::SecretString;

    #[test]
    fn empty_config_registers_nothing_and_explains_why() {
        let registry = ProviderRegistry::from_config(&AppConfig::default());

        assert!(registry.available().is_empty());
        assert!(matches!(
            registry.get(ProviderKind::Card),
            Err(GatewayError::Configuration { provider: ProviderKind::Card, .. })
        ));
    }

    #[test]
    fn configured_provider_is_registered_alone() {
        let mut config = AppConfig::default();
        config.card.secret_key = Some(SecretString::new("sk_test_123".to_string()));

        let registry = ProviderRegistry::from_config(&config);

        assert_eq!(registry.available(), vec![ProviderKind::Card]);
        assert!(registry.get(ProviderKind::Wallet).is_err());
    }

    #[test]
    fn unregistered_provider_without_reason_is_unknown() {
        let registry = ProviderRegistry::new()
            .with_provider(Arc::new(MockPaymentProvider::new(ProviderKind::Card)));

        assert!(registry.resolve("card").is_ok());
        assert_eq!(
            registry.resolve("crypto").err(),
            Some(GatewayError::UnknownProvider("crypto".to_string()))
        );
        assert_eq!(
            registry.resolve("bitcoin").err(),
            Some(GatewayError::UnknownProvider("bitcoin".to_string()))
        );
    }
}
