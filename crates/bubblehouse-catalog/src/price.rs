//! Price rendering for the wire schema.
//!
//! Prices go out as decimal strings with exactly six fractional digits, a
//! `.` separator and no digit grouping, e.g. `"9.990000"`. A missing, empty,
//! unparseable or zero price renders as `"0.000000"` and is flagged as
//! unknown.

use std::str::FromStr;

use rust_decimal::Decimal;

const FRACTION_DIGITS: u32 = 6;

/// A rendered price plus whether the store actually set one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedPrice {
    pub price: String,
    pub known: bool,
}

/// Parses a raw store price string.
///
/// Returns `None` for empty or unparseable input. Accepts plain decimals
/// (`"12.1"`) and scientific notation (`"1.5e2"`).
#[must_use]
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Renders `price` with six fractional digits.
///
/// A value too large to carry six fractional digits in a [`Decimal`] is
/// treated as unknown.
#[must_use]
pub fn format_price(price: Option<Decimal>) -> FormattedPrice {
    let value = price.unwrap_or(Decimal::ZERO);

    let mut rendered = value.round_dp(FRACTION_DIGITS);
    rendered.rescale(FRACTION_DIGITS);
    if rendered.scale() != FRACTION_DIGITS {
        return format_price(None);
    }
    let known = !value.is_zero();
    // Avoid "-0.000000" for negative values that round to zero.
    if rendered.is_zero() {
        rendered.set_sign_positive(true);
    }

    FormattedPrice {
        price: rendered.to_string(),
        known,
    }
}

/// Parses and renders a raw store price in one step.
#[must_use]
pub fn format_raw_price(raw: Option<&str>) -> FormattedPrice {
    format_price(raw.and_then(parse_price))
}
