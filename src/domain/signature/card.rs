//! Card processor webhook signatures.
//!
//! Header format: `Stripe-Signature: t=<unix secs>,v1=<hex>[,v1=<hex>...][,v0=<hex>]`.
//! The signed payload is `"{t}." ++ raw body`, MAC'd with HMAC-SHA256 under
//! the endpoint's webhook secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::{constant_time_compare, ReplayWindow, SignatureError};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the card processor's webhook signature.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Parsed components of the signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp (seconds) when the signature was generated.
    pub timestamp: i64,
    /// All `v1` signatures; several are present while a secret is rolled.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parses `t=<timestamp>,v1=<signature>[,...]`.
    ///
    /// Unknown schemes (including legacy `v0`) are ignored.
    pub fn parse(header: &str) -> Result<Self, SignatureError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| SignatureError::MalformedHeader("invalid header format".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        SignatureError::MalformedHeader("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    let signature = hex::decode(value).map_err(|_| {
                        SignatureError::MalformedHeader("invalid v1 signature hex".to_string())
                    })?;
                    v1_signatures.push(signature);
                }
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| SignatureError::MalformedHeader("missing timestamp".to_string()))?;
        if v1_signatures.is_empty() {
            return Err(SignatureError::MalformedHeader("missing v1 signature".to_string()));
        }

        Ok(SignatureHeader {
            timestamp,
            v1_signatures,
        })
    }
}

/// HMAC-SHA256 over `"{timestamp}."` followed by the raw body bytes.
pub fn compute(secret: &[u8], timestamp: i64, body: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length, so construction cannot fail.
    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return Vec::new(),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    mac.finalize().into_bytes().to_vec()
}

/// Lower-case hex signature, as it appears in the `v1` field.
pub fn sign(secret: &[u8], timestamp: i64, body: &[u8]) -> String {
    hex::encode(compute(secret, timestamp, body))
}

/// Builds a complete header value; used by tests and local tooling.
pub fn header_value(secret: &[u8], timestamp: i64, body: &[u8]) -> String {
    format!("t={},v1={}", timestamp, sign(secret, timestamp, body))
}

/// Verifies a delivery against the header value.
///
/// The timestamp is checked before the MAC so stale replays are rejected
/// even when correctly signed.
pub fn check(
    secret: &[u8],
    body: &[u8],
    header: &str,
    now_secs: i64,
    window: &ReplayWindow,
) -> Result<(), SignatureError> {
    let header = SignatureHeader::parse(header)?;
    window.check(header.timestamp.saturating_mul(1000), now_secs.saturating_mul(1000))?;

    let expected = compute(secret, header.timestamp, body);
    let matched = header
        .v1_signatures
        .iter()
        .any(|candidate| constant_time_compare(&expected, candidate));

    if matched {
        Ok(())
    } else {
        Err(SignatureError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"whsec_test_secret";
    const NOW: i64 = 1_704_067_200;

    fn window() -> ReplayWindow {
        ReplayWindow::default()
    }

    // ══════════════════════════════════════════════════════════════
    // Header parsing
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parse_header_with_single_v1() {
        let header = SignatureHeader::parse(&format!("t=1234567890,v1={}", "a".repeat(64))).unwrap();
        assert_eq!(header.timestamp, 1234567890);
        assert_eq!(header.v1_signatures.len(), 1);
        assert_eq!(header.v1_signatures[0].len(), 32);
    }

    #[test]
    fn parse_header_collects_rolled_signatures_and_ignores_v0() {
        let header = SignatureHeader::parse(&format!(
            "t=1,v1={},v1={},v0={}",
            "a".repeat(64),
            "b".repeat(64),
            "c".repeat(64)
        ))
        .unwrap();
        assert_eq!(header.v1_signatures.len(), 2);
    }

    #[test]
    fn parse_header_rejects_malformed_input() {
        for bad in ["", "t1234", "v1=abcd", "t=1", "t=abc,v1=abcd", "t=1,v1=zz"] {
            assert!(
                matches!(SignatureHeader::parse(bad), Err(SignatureError::MalformedHeader(_))),
                "{:?}",
                bad
            );
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Verification
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn known_vector() {
        assert_eq!(
            sign(SECRET, 1_700_000_000, br#"{"id":"evt_1"}"#),
            "248a374f50f943a28b0f6ab50faf9a7e7e29b710fa26df9fb1618b9bf8ea9c9a"
        );
    }

    #[test]
    fn fresh_correct_signature_verifies() {
        let body = br#"{"id":"evt_test","type":"checkout.session.completed"}"#;
        let header = header_value(SECRET, NOW, body);
        assert!(check(SECRET, body, &header, NOW, &window()).is_ok());
    }

    #[test]
    fn one_flipped_byte_fails() {
        let body = br#"{"id":"evt_test","amount":1000}"#.to_vec();
        let header = header_value(SECRET, NOW, &body);

        for i in 0..body.len() {
            let mut tampered = body.clone();
            tampered[i] ^= 0x01;
            assert_eq!(
                check(SECRET, &tampered, &header, NOW, &window()),
                Err(SignatureError::InvalidSignature)
            );
        }
    }

    #[test]
    fn wrong_secret_fails() {
        let body = b"{}";
        let header = header_value(b"other_secret", NOW, body);
        assert_eq!(
            check(SECRET, body, &header, NOW, &window()),
            Err(SignatureError::InvalidSignature)
        );
    }

    #[test]
    fn replay_outside_window_fails_even_when_signed() {
        let body = b"{}";
        let signed_at = NOW - 301;
        let header = header_value(SECRET, signed_at, body);
        assert_eq!(
            check(SECRET, body, &header, NOW, &window()),
            Err(SignatureError::TimestampOutOfRange)
        );
    }

    #[test]
    fn boundary_of_window_is_accepted() {
        let body = b"{}";
        let header = header_value(SECRET, NOW - 300, body);
        assert!(check(SECRET, body, &header, NOW, &window()).is_ok());
    }

    #[test]
    fn future_timestamp_beyond_skew_fails() {
        let body = b"{}";
        let header = header_value(SECRET, NOW + 120, body);
        assert_eq!(
            check(SECRET, body, &header, NOW, &window()),
            Err(SignatureError::TimestampInFuture)
        );

        let header = header_value(SECRET, NOW + 30, body);
        assert!(check(SECRET, body, &header, NOW, &window()).is_ok());
    }

    #[test]
    fn any_matching_v1_is_accepted() {
        let body = b"{}";
        let good = sign(SECRET, NOW, body);
        let header = format!("t={},v1={},v1={}", NOW, "0".repeat(64), good);
        assert!(check(SECRET, body, &header, NOW, &window()).is_ok());
    }

    #[test]
    fn non_utf8_body_is_signed_byte_exact() {
        let body = [0xff, 0xfe, 0x00, 0x7b];
        let header = header_value(SECRET, NOW, &body);
        assert!(check(SECRET, &body, &header, NOW, &window()).is_ok());
    }
}
