//! Numeric input handling shared by the calculator and the request payloads.
//!
//! Form fields arrive as free text. Anything that does not start with a
//! number counts as zero, and trailing garbage after a numeric prefix is
//! ignored (`"12abc"` reads as 12).
//!
//! Parsing is lenient but storage is not: line values are kept in
//! `decimal(18, 4)` columns and order totals in `decimal(18, 2)`, so
//! [`check_line_amount`] and the checked arithmetic below reject anything
//! those columns could not hold exactly.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Decimal places kept for every line value.
pub const LINE_SCALE: u32 = 4;

/// Exclusive magnitude bound for a line value, `decimal(18, 4)`.
pub const MAX_LINE_AMOUNT: Decimal = Decimal::from_parts(0x107A_4000, 0x5AF3, 0, false, 0);

/// Exclusive magnitude bound for an order total, `decimal(18, 2)`.
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(0x6FC1_0000, 0x0023_86F2, 0, false, 0);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("{0} is too large to compute")]
    Overflow(&'static str),

    #[error("{field} must be below {limit}")]
    OutOfRange { field: &'static str, limit: Decimal },

    #[error("{0} allows at most 4 decimal places")]
    TooPrecise(&'static str),
}

/// Verifies that `value` fits a line column without rounding.
pub fn check_line_amount(field: &'static str, value: Decimal) -> Result<(), AmountError> {
    if value.abs() >= MAX_LINE_AMOUNT {
        return Err(AmountError::OutOfRange {
            field,
            limit: MAX_LINE_AMOUNT,
        });
    }
    if value.normalize().scale() > LINE_SCALE {
        return Err(AmountError::TooPrecise(field));
    }
    Ok(())
}

/// Verifies that an order total fits its column.
pub fn check_order_total(field: &'static str, value: Decimal) -> Result<(), AmountError> {
    if value.abs() >= MAX_ORDER_TOTAL {
        return Err(AmountError::OutOfRange {
            field,
            limit: MAX_ORDER_TOTAL,
        });
    }
    Ok(())
}

pub(crate) fn checked(value: Option<Decimal>, field: &'static str) -> Result<Decimal, AmountError> {
    value.ok_or(AmountError::Overflow(field))
}

/// Rounds half away from zero to two decimal places.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses the longest numeric prefix of `raw`, returning zero when there is none.
pub fn parse_lenient(raw: &str) -> Decimal {
    let prefix = numeric_prefix(raw.trim_start());
    if prefix.is_empty() {
        return Decimal::ZERO;
    }

    let (negative, unsigned) = match prefix.as_bytes()[0] {
        b'-' => (true, &prefix[1..]),
        b'+' => (false, &prefix[1..]),
        _ => (false, prefix),
    };
    let mut normalized = String::with_capacity(unsigned.len() + 2);
    if negative {
        normalized.push('-');
    }
    if unsigned.starts_with('.') {
        normalized.push('0');
    }
    normalized.push_str(unsigned);

    if normalized.contains(['e', 'E']) {
        Decimal::from_scientific(&normalized).unwrap_or(Decimal::ZERO)
    } else {
        Decimal::from_str(&normalized).unwrap_or(Decimal::ZERO)
    }
}

fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return "";
    }

    // exponent only counts when at least one digit follows it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    // a bare trailing "." is not part of the number
    let prefix = &s[..end];
    prefix.strip_suffix('.').unwrap_or(prefix)
}

fn from_json(value: serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Number(n) => Some(parse_lenient(&n.to_string())),
        serde_json::Value::String(s) => Some(parse_lenient(&s)),
        _ => Some(Decimal::ZERO),
    }
}

/// Serde helper: numbers or numeric strings, with null and garbage read as zero.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(from_json(value).unwrap_or(Decimal::ZERO))
}

/// Serde helper for override fields: null means "not supplied".
pub fn deserialize_lenient_opt<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(from_json(value))
}
