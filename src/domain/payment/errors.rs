//! Error taxonomy shared by adapters, the webhook verifier and the gateway.
//!
//! Every failure crossing the gateway boundary is one of these variants.
//! The type is `Clone` because a single upstream result is shared between
//! all callers coalesced onto the same idempotency key.

use serde::Serialize;
use thiserror::Error;

use super::provider::ProviderKind;

/// Errors returned by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Credentials for the provider are missing or unusable.
    #[error("{provider} provider is not configured: missing {field}")]
    Configuration {
        provider: ProviderKind,
        field: &'static str,
    },

    /// Caller input is malformed.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Webhook authenticity could not be established.
    #[error("Signature verification failed: {0}")]
    SignatureVerification(String),

    /// Provider returned a non-2xx response or could not be reached.
    #[error("{provider} request failed: {message}")]
    Upstream {
        provider: ProviderKind,
        /// HTTP status, absent for transport failures and timeouts.
        status: Option<u16>,
        /// Raw provider response body, kept for diagnostics.
        body: String,
        message: String,
    },

    /// No adapter is registered under the requested name.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
}

impl GatewayError {
    pub fn configuration(provider: ProviderKind, field: &'static str) -> Self {
        Self::Configuration { provider, field }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn signature(reason: impl Into<String>) -> Self {
        Self::SignatureVerification(reason.into())
    }

    /// Non-2xx response from the provider.
    pub fn upstream_status(provider: ProviderKind, status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            provider,
            status: Some(status),
            body: body.into(),
            message: format!("provider responded with status {}", status),
        }
    }

    /// Transport-level failure (DNS, TLS, connection reset, unparseable body).
    pub fn network(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::Upstream {
            provider,
            status: None,
            body: String::new(),
            message: message.into(),
        }
    }

    /// The caller's wait budget elapsed before the provider answered.
    pub fn timeout(provider: ProviderKind, secs: u64) -> Self {
        Self::network(provider, format!("no response within {}s", secs))
    }

    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Configuration { .. } => "CONFIGURATION_ERROR",
            GatewayError::Validation(_) => "VALIDATION_ERROR",
            GatewayError::SignatureVerification(_) => "SIGNATURE_VERIFICATION_FAILED",
            GatewayError::Upstream { .. } => "UPSTREAM_ERROR",
            GatewayError::UnknownProvider(_) => "UNKNOWN_PROVIDER",
        }
    }

    /// Whether the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Upstream { .. })
    }

    /// Converts the error into the uniform envelope returned to callers.
    pub fn envelope(&self) -> ErrorEnvelope {
        let (status, body) = match self {
            GatewayError::Upstream { status, body, .. } => {
                (*status, Some(body.clone()).filter(|b| !b.is_empty()))
            }
            _ => (None, None),
        };

        ErrorEnvelope {
            code: self.code(),
            message: self.to_string(),
            retryable: self.is_retryable(),
            status,
            body,
        }
    }
}

/// Uniform, secret-free error description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}
