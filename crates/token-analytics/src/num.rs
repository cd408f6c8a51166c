//! Numeric Utilities
//!
//! Guarded parsing and division plus the display formats used by the
//! narrative generator. Every divisor is checked; nothing here panics.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde_json::Value;

/// Extract a finite `Decimal` from a loosely-typed JSON value.
///
/// Accepts numbers and numeric strings; NaN, infinities, and everything
/// else come back as `None`.
pub fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.as_f64().and_then(Decimal::from_f64),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `(a / b) × 100`, or zero when `b` is not positive.
pub fn pct(a: Decimal, b: Decimal) -> Decimal {
    ratio_pct_or(a, b, Decimal::ZERO)
}

/// `(a / b) × 100`, or `default` when `b` is not positive.
///
/// Overflow in the intermediate product also falls back to `default`.
pub fn ratio_pct_or(a: Decimal, b: Decimal, default: Decimal) -> Decimal {
    if b <= Decimal::ZERO {
        return default;
    }
    a.checked_div(b)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(default)
}

/// Format a price with precision scaled to its magnitude.
///
/// Sub-cent prices get more decimals so micro-cap tokens do not render
/// as `$0.00`.
pub fn format_price(price: Decimal) -> String {
    let p = price.abs();
    if p < dec!(0.0001) {
        format!("${price:.8}")
    } else if p < dec!(0.01) {
        format!("${price:.6}")
    } else if p < Decimal::ONE {
        format!("${price:.4}")
    } else if p < dec!(1000) {
        format!("${price:.2}")
    } else {
        format!("${}", grouped(price, 2))
    }
}

/// Short-form market value: `$1.23B`, `$4.50M`, `$9.99K`, else `$x.xx`.
pub fn format_market_value(value: Decimal) -> String {
    if value >= dec!(1_000_000_000) {
        format!("${:.2}B", value / dec!(1_000_000_000))
    } else if value >= dec!(1_000_000) {
        format!("${:.2}M", value / dec!(1_000_000))
    } else if value >= dec!(1000) {
        format!("${:.2}K", value / dec!(1000))
    } else {
        format!("${value:.2}")
    }
}

/// Token counts: thousands-grouped, no fractional part.
pub fn format_token_count(count: Decimal) -> String {
    grouped(count, 0)
}

/// Render with `dp` decimals and a comma-grouped integer part.
fn grouped(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.*}", dp as usize, rounded);
    let (head, tail) = match text.split_once('.') {
        Some((h, t)) => (h, Some(t)),
        None => (text.as_str(), None),
    };
    let (sign, digits) = head
        .strip_prefix('-')
        .map_or(("", head), |rest| ("-", rest));

    let mut out = String::with_capacity(text.len() + digits.len() / 3);
    out.push_str(sign);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - offset) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(t) = tail {
        out.push('.');
        out.push_str(t);
    }
    out
}
