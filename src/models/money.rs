use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;
use tracing::warn;

/// Number of decimal places kept for every money value
pub const MONEY_SCALE: u32 = 2;

/// Round a money value to 2 decimal places, half-up.
///
/// Amounts in this crate are never negative, so half-up and
/// midpoint-away-from-zero agree.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Subtotal for one cart line: `round2(amount * unit_price)`.
///
/// A product too large for `Decimal` is capped at `Decimal::MAX` and logged.
pub fn line_subtotal(amount: Decimal, unit_price: Decimal) -> Decimal {
    match amount.checked_mul(unit_price) {
        Some(subtotal) => round2(subtotal),
        None => {
            warn!(%amount, %unit_price, "Line subtotal overflowed and was capped");
            Decimal::MAX
        }
    }
}

/// Sum a sequence of money values and round the result.
///
/// A sum too large for `Decimal` is capped at `Decimal::MAX` and logged.
pub fn sum_rounded<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    let mut total = Decimal::ZERO;
    for value in values {
        total = match total.checked_add(value) {
            Some(sum) => sum,
            None => {
                warn!(%total, %value, "Money total overflowed and was capped");
                return Decimal::MAX;
            }
        };
    }
    round2(total)
}

/// Parse a user-entered amount out of a raw JSON value.
///
/// Numbers and numeric strings parse; everything else (null, empty or
/// non-numeric strings, booleans, arrays, objects) is `None`.
pub fn parse_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => parse_amount_str(&number.to_string()),
        Value::String(text) => parse_amount_str(text),
        _ => None,
    }
}

/// Parse a numeric string, accepting plain and scientific notation.
///
/// Numbers outside what `Decimal` can hold saturate: magnitudes of one and
/// above become `Decimal::MAX` or `Decimal::MIN`, smaller ones become zero.
/// Either way a warning is logged, so callers clamp a real value instead of
/// falling back to their "unreadable input" default.
pub fn parse_amount_str(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed));
    if let Ok(amount) = parsed {
        return Some(amount);
    }

    // f64 also accepts "inf" and "nan"; only digits count as a number here
    if !trimmed.bytes().any(|byte| byte.is_ascii_digit()) {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if !value.is_nan() => {
            let saturated = if value.abs() < 1.0 {
                Decimal::ZERO
            } else if value.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            };
            warn!(input = trimmed, amount = %saturated, "Amount out of range, saturated");
            Some(saturated)
        }
        _ => None,
    }
}

/// Convert a clamped quantity to `u32`, saturating on overflow.
pub(crate) fn saturating_u32(value: Decimal) -> u32 {
    if value.is_sign_negative() {
        return 0;
    }
    value.to_u32().unwrap_or(u32::MAX)
}
