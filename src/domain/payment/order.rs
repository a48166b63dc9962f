//! Order creation request and normalized result.

use rust_decimal::Decimal;
use serde::Serialize;

use super::errors::GatewayError;
use super::money;
use super::provider::ProviderKind;

/// Maximum accepted idempotency key length.
const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

/// A caller's request to create a payment order with one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    /// Provider that should create the order.
    pub provider: ProviderKind,

    /// Amount in major units, decimal-exact.
    pub amount: Decimal,

    /// ISO 4217 code or crypto asset symbol.
    pub currency: String,

    /// Product or goods name shown to the payer.
    pub description: String,

    /// Where the payer lands after paying.
    pub return_url: String,

    /// Where the payer lands after abandoning payment.
    pub cancel_url: String,

    /// Caller token collapsing repeated requests onto one provider order.
    pub idempotency_key: String,
}

impl OrderRequest {
    /// Creates a request with a freshly generated idempotency key.
    pub fn new(provider: ProviderKind, amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            provider,
            amount,
            currency: currency.into(),
            description: String::new(),
            return_url: String::new(),
            cancel_url: String::new(),
            idempotency_key: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = url.into();
        self
    }

    pub fn with_cancel_url(mut self, url: impl Into<String>) -> Self {
        self.cancel_url = url.into();
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = key.into();
        self
    }

    /// Provider-independent input checks.
    pub fn validate(&self) -> Result<(), GatewayError> {
        money::ensure_positive(self.amount)?;

        let currency_ok = (3..=10).contains(&self.currency.len())
            && self.currency.chars().all(|c| c.is_ascii_alphanumeric());
        if !currency_ok {
            return Err(GatewayError::validation(format!(
                "currency '{}' is not a valid currency or asset code",
                self.currency
            )));
        }

        if self.idempotency_key.trim().is_empty() {
            return Err(GatewayError::validation("idempotency key must not be empty"));
        }
        if self.idempotency_key.len() > MAX_IDEMPOTENCY_KEY_LEN {
            return Err(GatewayError::validation("idempotency key is too long"));
        }

        Ok(())
    }
}

/// Normalized outcome of one successful order creation.
///
/// Failures travel as `Err(GatewayError)` and are rendered as an `ok: false`
/// error envelope at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderResult {
    pub ok: bool,
    pub provider: ProviderKind,
    pub provider_order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Provider response as received; the only provider-shaped field.
    pub raw_provider_payload: serde_json::Value,
}

impl OrderResult {
    pub fn created(
        provider: ProviderKind,
        provider_order_id: impl Into<String>,
        redirect_url: Option<String>,
        raw_provider_payload: serde_json::Value,
    ) -> Self {
        Self {
            ok: true,
            provider,
            provider_order_id: provider_order_id.into(),
            redirect_url,
            raw_provider_payload,
        }
    }
}
