//! Crypto-pay request signing and webhook verification.
//!
//! Both directions sign the same canonical string:
//! `"{timestamp_ms}\n{nonce}\n{body}\n"`. Outbound requests use HMAC-SHA512
//! under the merchant secret (upper-case hex). Inbound notifications carry a
//! base64 RSA PKCS#1 v1.5 / SHA-256 signature made with the provider key that
//! matches `BinancePay-Certificate-SN`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use http::HeaderMap;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use rsa::RsaPublicKey;
use sha2::{Sha256, Sha512};

use super::{ReplayWindow, SignatureError, SignaturePayload};

type HmacSha512 = Hmac<Sha512>;

pub const TIMESTAMP_HEADER: &str = "BinancePay-Timestamp";
pub const NONCE_HEADER: &str = "BinancePay-Nonce";
pub const CERTIFICATE_SN_HEADER: &str = "BinancePay-Certificate-SN";
pub const SIGNATURE_HEADER: &str = "BinancePay-Signature";

/// Exact bytes covered by a signature in either direction.
pub fn canonical_bytes(payload: &SignaturePayload) -> Vec<u8> {
    let timestamp = payload.timestamp.to_string();
    let mut bytes = Vec::with_capacity(
        timestamp.len() + payload.nonce.len() + payload.canonical_body.len() + 3,
    );
    bytes.extend_from_slice(timestamp.as_bytes());
    bytes.push(b'\n');
    bytes.extend_from_slice(payload.nonce.as_bytes());
    bytes.push(b'\n');
    bytes.extend_from_slice(&payload.canonical_body);
    bytes.push(b'\n');
    bytes
}

/// HMAC-SHA512 request signature, upper-case hex.
pub fn sign_request(secret: &[u8], payload: &SignaturePayload) -> String {
    let mut mac = match HmacSha512::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(&canonical_bytes(payload));
    hex::encode_upper(mac.finalize().into_bytes())
}

/// Signature headers of an inbound notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookHeaders {
    pub timestamp: i64,
    pub nonce: String,
    pub certificate_sn: String,
    pub signature: Vec<u8>,
}

impl WebhookHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, SignatureError> {
        let timestamp = required(headers, TIMESTAMP_HEADER)?
            .parse()
            .map_err(|_| SignatureError::MalformedHeader("invalid timestamp".to_string()))?;
        let nonce = required(headers, NONCE_HEADER)?.to_string();
        let certificate_sn = required(headers, CERTIFICATE_SN_HEADER)?.to_string();
        let signature = BASE64
            .decode(required(headers, SIGNATURE_HEADER)?)
            .map_err(|_| SignatureError::MalformedHeader("signature is not base64".to_string()))?;

        Ok(Self {
            timestamp,
            nonce,
            certificate_sn,
            signature,
        })
    }

    /// Payload the provider signed, rebuilt around the raw body.
    pub fn payload(&self, body: &[u8]) -> SignaturePayload {
        SignaturePayload::new(body.to_vec(), self.timestamp, self.nonce.clone())
    }
}

fn required<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, SignatureError> {
    let value = headers
        .get(name)
        .ok_or(SignatureError::MissingHeader(name))?
        .to_str()
        .map_err(|_| SignatureError::MalformedHeader(format!("{} is not ASCII", name)))?
        .trim();
    if value.is_empty() {
        return Err(SignatureError::MissingHeader(name));
    }
    Ok(value)
}

/// Parses a provider public key, either SPKI (`BEGIN PUBLIC KEY`) or
/// PKCS#1 (`BEGIN RSA PUBLIC KEY`).
pub fn parse_public_key(pem: &str) -> Result<RsaPublicKey, SignatureError> {
    let pem = pem.trim();
    RsaPublicKey::from_public_key_pem(pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
        .map_err(|e| SignatureError::InvalidKey(e.to_string()))
}

/// Verifies an inbound notification whose headers are already parsed.
pub fn check(
    public_key: &RsaPublicKey,
    body: &[u8],
    headers: &WebhookHeaders,
    now_ms: i64,
    window: &ReplayWindow,
) -> Result<(), SignatureError> {
    window.check(headers.timestamp, now_ms)?;

    let signature = Signature::try_from(headers.signature.as_slice())
        .map_err(|_| SignatureError::InvalidSignature)?;
    let verifying_key = VerifyingKey::<Sha256>::new(public_key.clone());

    verifying_key
        .verify(&canonical_bytes(&headers.payload(body)), &signature)
        .map_err(|_| SignatureError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use rsa::pkcs1v15::SigningKey;
    use rsa::pkcs8::DecodePrivateKey;
    use rsa::signature::{SignatureEncoding, Signer};
    use rsa::RsaPrivateKey;

    const PRIVATE_PEM: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/crypto_webhook_key.pem"
    ));
    const PUBLIC_PEM: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/crypto_webhook_pub.pem"
    ));

    const NOW_MS: i64 = 1_704_067_200_000;

    fn signed_headers(body: &[u8], timestamp: i64) -> HeaderMap {
        let key = RsaPrivateKey::from_pkcs8_pem(PRIVATE_PEM).unwrap();
        let signing_key = SigningKey::<Sha256>::new(key);
        let payload = SignaturePayload::new(body.to_vec(), timestamp, "nonce-1");
        let signature = signing_key.sign(&canonical_bytes(&payload));

        let mut headers = HeaderMap::new();
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from_str(&timestamp.to_string()).unwrap());
        headers.insert(NONCE_HEADER, HeaderValue::from_static("nonce-1"));
        headers.insert(CERTIFICATE_SN_HEADER, HeaderValue::from_static("cert-1"));
        headers.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(&BASE64.encode(signature.to_bytes())).unwrap(),
        );
        headers
    }

    // ══════════════════════════════════════════════════════════════
    // Request signing
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn request_signature_matches_fixture() {
        let payload = SignaturePayload::new(br#"{"a":1}"#.to_vec(), 1_700_000_000_000, "abc123");
        assert_eq!(
            sign_request(b"test-secret", &payload),
            "D02D281CD2BF3E96637548AF7793F697121E2CA2C1E072838EBC930715054FB79239A16C158B5B9F40B539F2AE587015490C038C4B9B8EBEA6A7BB70D827D75F"
        );
    }

    #[test]
    fn canonical_string_layout() {
        let payload = SignaturePayload::new(b"{}".to_vec(), 42, "n");
        assert_eq!(canonical_bytes(&payload), b"42\nn\n{}\n".to_vec());
    }

    #[test]
    fn request_signature_is_upper_hex_of_sha512_width() {
        let payload = SignaturePayload::new(b"{}".to_vec(), 1, "n");
        let signature = sign_request(b"k", &payload);
        assert_eq!(signature.len(), 128);
        assert!(signature.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    // ══════════════════════════════════════════════════════════════
    // Webhook verification
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parses_both_public_key_encodings() {
        assert!(parse_public_key(PUBLIC_PEM).is_ok());

        use rsa::pkcs1::EncodeRsaPublicKey;
        let key = parse_public_key(PUBLIC_PEM).unwrap();
        let pkcs1 = key.to_pkcs1_pem(rsa::pkcs8::LineEnding::LF).unwrap();
        assert_eq!(parse_public_key(&pkcs1).unwrap(), key);

        assert!(matches!(
            parse_public_key("not a key"),
            Err(SignatureError::InvalidKey(_))
        ));
    }

    #[test]
    fn correctly_signed_notification_verifies() {
        let body = br#"{"bizType":"PAY","bizStatus":"PAY_SUCCESS","data":"{}"}"#;
        let headers = WebhookHeaders::from_headers(&signed_headers(body, NOW_MS)).unwrap();
        let key = parse_public_key(PUBLIC_PEM).unwrap();

        assert_eq!(headers.certificate_sn, "cert-1");
        assert!(check(&key, body, &headers, NOW_MS, &ReplayWindow::default()).is_ok());
    }

    #[test]
    fn tampered_body_fails() {
        let body = br#"{"bizStatus":"PAY_CLOSED"}"#;
        let headers = WebhookHeaders::from_headers(&signed_headers(body, NOW_MS)).unwrap();
        let key = parse_public_key(PUBLIC_PEM).unwrap();

        assert_eq!(
            check(&key, br#"{"bizStatus":"PAY_SUCCESS"}"#, &headers, NOW_MS, &ReplayWindow::default()),
            Err(SignatureError::InvalidSignature)
        );
    }

    #[test]
    fn stale_notification_fails() {
        let body = b"{}";
        let headers = WebhookHeaders::from_headers(&signed_headers(body, NOW_MS - 301_000)).unwrap();
        let key = parse_public_key(PUBLIC_PEM).unwrap();

        assert_eq!(
            check(&key, body, &headers, NOW_MS, &ReplayWindow::default()),
            Err(SignatureError::TimestampOutOfRange)
        );
    }

    #[test]
    fn missing_or_garbled_headers_are_typed_failures() {
        let mut headers = signed_headers(b"{}", NOW_MS);
        headers.remove(NONCE_HEADER);
        assert_eq!(
            WebhookHeaders::from_headers(&headers),
            Err(SignatureError::MissingHeader(NONCE_HEADER))
        );

        let mut headers = signed_headers(b"{}", NOW_MS);
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_static("%%%"));
        assert!(matches!(
            WebhookHeaders::from_headers(&headers),
            Err(SignatureError::MalformedHeader(_))
        ));

        let mut headers = signed_headers(b"{}", NOW_MS);
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from_static("yesterday"));
        assert!(matches!(
            WebhookHeaders::from_headers(&headers),
            Err(SignatureError::MalformedHeader(_))
        ));
    }

    #[test]
    fn short_signature_is_rejected_not_panicking() {
        let key = parse_public_key(PUBLIC_PEM).unwrap();
        let headers = WebhookHeaders {
            timestamp: NOW_MS,
            nonce: "n".to_string(),
            certificate_sn: "c".to_string(),
            signature: vec![1, 2, 3],
        };
        assert_eq!(
            check(&key, b"{}", &headers, NOW_MS, &ReplayWindow::default()),
            Err(SignatureError::InvalidSignature)
        );
    }
}
