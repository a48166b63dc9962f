//! Merchant-side references and request nonces.

use std::sync::atomic::{AtomicU64, Ordering};

/// Longest trade reference crypto-pay accepts.
pub const MAX_TRADE_NO_LEN: usize = 32;

/// Longest prefix kept from configuration.
const MAX_PREFIX_LEN: usize = 6;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generates a merchant trade reference.
///
/// Layout: `<prefix><unix-ms><4-digit sequence><8 hex random>`. Letters and
/// digits only, at most 32 characters. The in-process sequence separates
/// calls landing in the same millisecond; the random suffix separates
/// processes.
pub fn merchant_trade_no(prefix: &str) -> String {
    let prefix: String = prefix
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_PREFIX_LEN)
        .collect();
    let millis = chrono::Utc::now().timestamp_millis();
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed) % 10_000;
    let random: [u8; 4] = rand::random();

    format!("{}{}{:04}{}", prefix, millis, sequence, hex::encode(random))
}

/// 32-character request nonce.
pub fn nonce() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}
