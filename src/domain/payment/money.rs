//! Decimal-exact amount handling.
//!
//! Amounts travel as `rust_decimal::Decimal` from the HTTP boundary to the
//! provider payload. Conversion to minor units is done in decimal arithmetic
//! and refuses amounts the currency cannot represent.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::errors::GatewayError;

/// Currencies without a minor unit.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "JPY", "KMF", "KRW", "MGA", "PYG", "RWF", "UGX", "VND", "VUV",
    "XAF", "XOF", "XPF",
];

/// Currencies with three decimal places.
const THREE_DECIMAL_CURRENCIES: &[&str] = &["BHD", "JOD", "KWD", "OMR", "TND"];

/// Number of decimal places of the currency's minor unit.
pub fn currency_exponent(currency: &str) -> u32 {
    let code = currency.to_ascii_uppercase();
    if ZERO_DECIMAL_CURRENCIES.contains(&code.as_str()) {
        0
    } else if THREE_DECIMAL_CURRENCIES.contains(&code.as_str()) {
        3
    } else {
        2
    }
}

/// Rejects zero and negative amounts.
pub fn ensure_positive(amount: Decimal) -> Result<(), GatewayError> {
    if amount <= Decimal::ZERO {
        return Err(GatewayError::validation("amount must be greater than zero"));
    }
    Ok(())
}

/// Converts a major-unit amount into the currency's minor units.
///
/// `19.99 USD` becomes `1999`; `500 JPY` stays `500`. Amounts with more
/// precision than the currency supports (`1.005 USD`) are rejected rather
/// than rounded.
pub fn to_minor_units(amount: Decimal, currency: &str) -> Result<i64, GatewayError> {
    ensure_positive(amount)?;

    let exponent = currency_exponent(currency);
    let factor = Decimal::from(10_i64.pow(exponent));
    let scaled = amount
        .checked_mul(factor)
        .ok_or_else(|| GatewayError::validation("amount is too large"))?;

    if !scaled.fract().is_zero() {
        return Err(GatewayError::validation(format!(
            "amount {} has more than {} decimal places for {}",
            amount,
            exponent,
            currency.to_ascii_uppercase()
        )));
    }

    scaled
        .trunc()
        .to_i64()
        .ok_or_else(|| GatewayError::validation("amount is too large"))
}
