//! Decimal parsing and formatting helpers
//!
//! Side-effect free and locale independent: a single `.` or `,` is accepted as the fraction
//! separator when parsing, output always uses `.`.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::amount::Error;
use crate::token::Token;

/// Fraction digits kept for fiat values
pub const FIAT_DECIMALS: u32 = 2;

/// Parse user entered text into an exact decimal with at most `decimals` fraction digits.
///
/// Empty text parses to zero (the field was cleared).
pub fn parse_decimal(text: &str, decimals: u32) -> Result<Decimal, Error> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let mut separators = text.char_indices().filter(|(_, c)| *c == '.' || *c == ',');
    let (integer, fraction) = match (separators.next(), separators.next()) {
        (None, _) => (text, ""),
        (Some((idx, _)), None) => (&text[..idx], &text[idx + 1..]),
        (Some(_), Some(_)) => return Err(Error::InvalidAmount(text.to_string())),
    };

    if integer.is_empty() && fraction.is_empty() {
        return Err(Error::InvalidAmount(text.to_string()));
    }

    if !integer.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(Error::InvalidAmount(text.to_string()));
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(Error::TooManyDecimals(decimals));
    }

    let integer = if integer.is_empty() { "0" } else { integer };
    let normalized = if fraction.is_empty() {
        integer.to_string()
    } else {
        format!("{integer}.{fraction}")
    };

    Decimal::from_str(&normalized).map_err(|_| Error::InvalidAmount(text.to_string()))
}

/// Truncate (toward zero) to `digits` fraction digits
pub fn truncate_fraction(value: Decimal, digits: u32) -> Decimal {
    value.round_dp_with_strategy(digits, RoundingStrategy::ToZero)
}

/// Format a decimal with at most `max_fraction` fraction digits, without trailing zeros
pub fn format_decimal(value: Decimal, max_fraction: u32) -> String {
    truncate_fraction(value, max_fraction).normalize().to_string()
}

/// Format an amount of `token` followed by its symbol
pub fn format_token_amount(value: Decimal, token: &Token) -> String {
    format!("{} {}", format_decimal(value, token.decimals), token.symbol)
}

/// Format basis points as a percentage, `50` -> `0.5%`
pub fn format_percent(bps: u16) -> String {
    format!("{}%", Decimal::new(i64::from(bps), 2).normalize())
}

/// Fiat value of a token amount, truncated to cents
pub fn to_fiat(amount: Decimal, price: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(price)
        .map(|value| truncate_fraction(value, FIAT_DECIMALS))
}

/// Token amount for a fiat value, truncated to the token's decimals.
///
/// Returns `None` when the price is zero or the conversion overflows.
pub fn from_fiat(fiat: Decimal, price: Decimal, decimals: u32) -> Option<Decimal> {
    if price.is_zero() {
        return None;
    }

    fiat.checked_div(price)
        .map(|value| truncate_fraction(value, decimals))
}

/// Whether `amount` is strictly greater than `limit`
pub fn exceeds(amount: Decimal, limit: Decimal) -> bool {
    amount > limit
}
