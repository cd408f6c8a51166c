//! Vesting Evaluator
//!
//! Computes the unlocked token amount for a single allocation at a point
//! in time. Month arithmetic uses a fixed 30-day month so schedules line
//! up with the historical output of the product.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::model::{Allocation, VestingKind};

/// Length of one schedule month in milliseconds (fixed 30-day month).
pub const MONTH_MS: i64 = 30 * 24 * 60 * 60 * 1000;

/// One schedule month as a `chrono` duration.
pub fn month() -> Duration {
    Duration::milliseconds(MONTH_MS)
}

/// Real-valued months elapsed between `launch` and `t`, clamped at zero.
pub fn months_between(launch: DateTime<Utc>, t: DateTime<Utc>) -> Decimal {
    let ms = (t - launch).num_milliseconds();
    if ms <= 0 {
        return Decimal::ZERO;
    }
    Decimal::from(ms) / Decimal::from(MONTH_MS)
}

/// Unlocked tokens of `alloc` after `months` elapsed months.
///
/// Rules:
/// - no vesting: the full amount, unconditionally (pre-launch included;
///   the product treats liquid pools as always circulating);
/// - linear: `amount × min(1, m / D)`;
/// - cliff: zero while `m < C`, then `amount × min(1, (m − C) / (D − C))`.
///
/// A zero vesting duration on a vesting kind counts as fully vested, so
/// no division by zero can occur. `months` may be fractional; the
/// schedule projector samples it at whole months.
pub fn unlocked_amount(alloc: &Allocation, months: Decimal) -> Decimal {
    let m = months.max(Decimal::ZERO);
    match alloc.kind {
        VestingKind::None => alloc.amount,
        VestingKind::Linear => {
            let duration = Decimal::from(alloc.vesting_duration);
            if duration.is_zero() {
                return alloc.amount;
            }
            alloc.amount * (m / duration).min(Decimal::ONE)
        }
        VestingKind::Cliff => {
            let duration = Decimal::from(alloc.vesting_duration);
            let cliff = Decimal::from(alloc.cliff_duration);
            if duration.is_zero() {
                return alloc.amount;
            }
            if m < cliff {
                return Decimal::ZERO;
            }
            let span = duration - cliff;
            if span <= Decimal::ZERO {
                return alloc.amount;
            }
            alloc.amount * ((m - cliff) / span).min(Decimal::ONE)
        }
    }
}

/// Unlocked tokens of `alloc` at the absolute instant `t`.
pub fn unlocked_at(alloc: &Allocation, launch: DateTime<Utc>, t: DateTime<Utc>) -> Decimal {
    unlocked_amount(alloc, months_between(launch, t))
}
