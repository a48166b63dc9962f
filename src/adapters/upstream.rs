//! Shared plumbing for provider HTTP calls.
//!
//! Converts reqwest failures and non-2xx responses into [`GatewayError`]
//! so adapters never surface library errors.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::domain::payment::{GatewayError, ProviderKind};

/// HTTP client with a bounded per-request timeout.
pub(crate) fn client(provider: ProviderKind, timeout: Duration) -> Result<Client, GatewayError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GatewayError::network(provider, format!("failed to build HTTP client: {}", e)))
}

/// Classifies a failed send.
pub(crate) fn transport_error(provider: ProviderKind, err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::network(provider, "provider request timed out")
    } else if err.is_connect() {
        GatewayError::network(provider, format!("connection failed: {}", err))
    } else {
        GatewayError::network(provider, err.to_string())
    }
}

/// Reads a response, failing on non-2xx, and decodes the body as `T`.
///
/// Returns the decoded value together with the raw JSON so adapters can
/// hand the provider payload back untouched.
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: ProviderKind,
    response: Response,
) -> Result<(T, serde_json::Value), GatewayError> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(provider, e))?;

    if !(200..300).contains(&status) {
        tracing::warn!(provider = %provider, status, "provider rejected request");
        return Err(GatewayError::upstream_status(provider, status, body));
    }

    let raw: serde_json::Value = serde_json::from_str(&body).map_err(|e| unparseable(provider, status, &body, e))?;
    let typed = serde_json::from_value(raw.clone()).map_err(|e| unparseable(provider, status, &body, e))?;
    Ok((typed, raw))
}

fn unparseable(provider: ProviderKind, status: u16, body: &str, err: serde_json::Error) -> GatewayError {
    GatewayError::Upstream {
        provider,
        status: Some(status),
        body: body.to_string(),
        message: format!("unparseable provider response: {}", err),
    }
}
