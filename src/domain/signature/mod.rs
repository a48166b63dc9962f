//! Signature engine.
//!
//! Pure functions computing and verifying provider signatures. Nothing here
//! performs I/O; keys are handed in by the caller.

pub mod card;
pub mod crypto;

use chrono::{DateTime, Utc};
use http::HeaderMap;
use rsa::RsaPublicKey;
use subtle::ConstantTimeEq;
use thiserror::Error;

use super::payment::{GatewayError, ProviderKind};

/// Default replay tolerance for signed notifications.
pub const DEFAULT_REPLAY_TOLERANCE_SECS: i64 = 300;

/// Default allowance for sender clocks running ahead of ours.
pub const DEFAULT_CLOCK_SKEW_SECS: i64 = 60;

/// Bytes a signature covers plus the values bound into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignaturePayload {
    pub canonical_body: Vec<u8>,
    /// Unix milliseconds.
    pub timestamp: i64,
    pub nonce: String,
}

impl SignaturePayload {
    pub fn new(canonical_body: impl Into<Vec<u8>>, timestamp: i64, nonce: impl Into<String>) -> Self {
        Self {
            canonical_body: canonical_body.into(),
            timestamp,
            nonce: nonce.into(),
        }
    }
}

/// Signature failures. Callers classify all of them as signature verification errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("missing {0} header")]
    MissingHeader(&'static str),

    #[error("malformed signature header: {0}")]
    MalformedHeader(String),

    #[error("timestamp outside replay tolerance")]
    TimestampOutOfRange,

    #[error("timestamp too far in the future")]
    TimestampInFuture,

    #[error("signature mismatch")]
    InvalidSignature,

    #[error("invalid verification key: {0}")]
    InvalidKey(String),

    #[error("{0} notifications are not verified locally")]
    Unsupported(ProviderKind),

    #[error("verification key does not fit {0} signatures")]
    KeyMismatch(ProviderKind),
}

impl From<SignatureError> for GatewayError {
    fn from(err: SignatureError) -> Self {
        GatewayError::signature(err.to_string())
    }
}

/// Accepted age range of a signed timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayWindow {
    pub max_age_secs: i64,
    pub max_future_skew_secs: i64,
}

impl Default for ReplayWindow {
    fn default() -> Self {
        Self {
            max_age_secs: DEFAULT_REPLAY_TOLERANCE_SECS,
            max_future_skew_secs: DEFAULT_CLOCK_SKEW_SECS,
        }
    }
}

impl ReplayWindow {
    pub fn with_max_age(max_age_secs: i64) -> Self {
        Self {
            max_age_secs,
            ..Self::default()
        }
    }

    /// Both arguments are unix milliseconds.
    pub fn check(&self, timestamp_ms: i64, now_ms: i64) -> Result<(), SignatureError> {
        let age_ms = now_ms.saturating_sub(timestamp_ms);
        if age_ms > self.max_age_secs.saturating_mul(1000) {
            return Err(SignatureError::TimestampOutOfRange);
        }
        if age_ms < -self.max_future_skew_secs.saturating_mul(1000) {
            return Err(SignatureError::TimestampInFuture);
        }
        Ok(())
    }
}

/// Key material used to check an inbound signature.
#[derive(Debug, Clone, Copy)]
pub enum VerificationKey<'a> {
    /// Shared HMAC secret (card).
    Hmac(&'a [u8]),
    /// Provider public key selected by certificate serial (crypto).
    Rsa(&'a RsaPublicKey),
}

/// Dispatches signing and verification by provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureEngine {
    window: ReplayWindow,
}

impl SignatureEngine {
    pub fn new(window: ReplayWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> ReplayWindow {
        self.window
    }

    /// Outbound signature for `payload`; `None` when the provider does not
    /// sign requests (wallet authenticates with a bearer token).
    ///
    /// The card scheme signs `"{secs}.{body}"`, so the millisecond timestamp
    /// is truncated to seconds.
    pub fn sign(&self, provider: ProviderKind, secret: &[u8], payload: &SignaturePayload) -> Option<String> {
        match provider {
            ProviderKind::Card => Some(card::sign(
                secret,
                payload.timestamp.div_euclid(1000),
                &payload.canonical_body,
            )),
            ProviderKind::Crypto => Some(crypto::sign_request(secret, payload)),
            ProviderKind::Wallet => None,
        }
    }

    pub fn verify(&self, provider: ProviderKind, key: VerificationKey<'_>, body: &[u8], headers: &HeaderMap) -> bool {
        self.check(provider, key, body, headers).is_ok()
    }

    pub fn check(
        &self,
        provider: ProviderKind,
        key: VerificationKey<'_>,
        body: &[u8],
        headers: &HeaderMap,
    ) -> Result<(), SignatureError> {
        self.check_at(provider, key, body, headers, Utc::now())
    }

    pub fn check_at(
        &self,
        provider: ProviderKind,
        key: VerificationKey<'_>,
        body: &[u8],
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> Result<(), SignatureError> {
        match (provider, key) {
            (ProviderKind::Card, VerificationKey::Hmac(secret)) => {
                let header = headers
                    .get(card::SIGNATURE_HEADER)
                    .ok_or(SignatureError::MissingHeader(card::SIGNATURE_HEADER))?
                    .to_str()
                    .map_err(|_| SignatureError::MalformedHeader("header is not ASCII".to_string()))?;
                card::check(secret, body, header, now.timestamp(), &self.window)
            }
            (ProviderKind::Crypto, VerificationKey::Rsa(public_key)) => {
                let parsed = crypto::WebhookHeaders::from_headers(headers)?;
                crypto::check(public_key, body, &parsed, now.timestamp_millis(), &self.window)
            }
            (ProviderKind::Wallet, _) => Err(SignatureError::Unsupported(provider)),
            (provider, _) => Err(SignatureError::KeyMismatch(provider)),
        }
    }
}

/// Constant-time byte comparison.
pub(crate) fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use http::HeaderValue;

    const SECRET: &[u8] = b"whsec_test_secret";

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_704_067_200, 0).unwrap()
    }

    fn card_headers(body: &[u8], timestamp: i64) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            card::SIGNATURE_HEADER,
            HeaderValue::from_str(&card::header_value(SECRET, timestamp, body)).unwrap(),
        );
        headers
    }

    #[test]
    fn replay_window_bounds() {
        let window = ReplayWindow::default();
        assert!(window.check(1_000_000, 1_000_000).is_ok());
        assert!(window.check(1_000_000 - 300_000, 1_000_000).is_ok());
        assert_eq!(
            window.check(1_000_000 - 300_001, 1_000_000),
            Err(SignatureError::TimestampOutOfRange)
        );
        assert!(window.check(1_000_000 + 60_000, 1_000_000).is_ok());
        assert_eq!(
            window.check(1_000_000 + 60_001, 1_000_000),
            Err(SignatureError::TimestampInFuture)
        );
    }

    #[test]
    fn extreme_timestamps_do_not_overflow() {
        let window = ReplayWindow::default();
        assert!(window.check(i64::MIN, i64::MAX).is_err());
        assert!(window.check(i64::MAX, i64::MIN).is_err());
    }

    #[test]
    fn constant_time_compare_works() {
        assert!(constant_time_compare(b"hello", b"hello"));
        assert!(!constant_time_compare(b"hello", b"world"));
        assert!(!constant_time_compare(b"hello", b"hell"));
        assert!(constant_time_compare(b"", b""));
    }

    #[test]
    fn sign_dispatches_by_provider() {
        let engine = SignatureEngine::default();
        let payload = SignaturePayload::new(br#"{"a":1}"#.to_vec(), 1_700_000_000_000, "abc123");

        assert_eq!(
            engine.sign(ProviderKind::Crypto, b"test-secret", &payload).unwrap(),
            crypto::sign_request(b"test-secret", &payload)
        );
        assert_eq!(
            engine.sign(ProviderKind::Card, SECRET, &payload).unwrap(),
            card::sign(SECRET, 1_700_000_000, br#"{"a":1}"#)
        );
        assert_eq!(engine.sign(ProviderKind::Wallet, b"x", &payload), None);
    }

    #[test]
    fn verify_card_through_engine() {
        let engine = SignatureEngine::default();
        let body = br#"{"id":"evt_1"}"#;
        let headers = card_headers(body, now().timestamp());

        assert!(engine
            .check_at(ProviderKind::Card, VerificationKey::Hmac(SECRET), body, &headers, now())
            .is_ok());
        assert!(engine
            .check_at(ProviderKind::Card, VerificationKey::Hmac(b"wrong"), body, &headers, now())
            .is_err());
    }

    #[test]
    fn missing_header_is_false_not_panic() {
        let engine = SignatureEngine::default();
        assert!(!engine.verify(ProviderKind::Card, VerificationKey::Hmac(SECRET), b"{}", &HeaderMap::new()));
        assert_eq!(
            engine.check_at(ProviderKind::Card, VerificationKey::Hmac(SECRET), b"{}", &HeaderMap::new(), now()),
            Err(SignatureError::MissingHeader(card::SIGNATURE_HEADER))
        );
    }

    #[test]
    fn wallet_and_mismatched_keys_are_refused() {
        let engine = SignatureEngine::default();
        assert_eq!(
            engine.check(ProviderKind::Wallet, VerificationKey::Hmac(SECRET), b"{}", &HeaderMap::new()),
            Err(SignatureError::Unsupported(ProviderKind::Wallet))
        );
        assert_eq!(
            engine.check(ProviderKind::Crypto, VerificationKey::Hmac(SECRET), b"{}", &HeaderMap::new()),
            Err(SignatureError::KeyMismatch(ProviderKind::Crypto))
        );
    }

    #[test]
    fn signature_errors_map_to_verification_failures() {
        let err: GatewayError = SignatureError::InvalidSignature.into();
        assert_eq!(err.code(), "SIGNATURE_VERIFICATION_FAILED");
    }
}
