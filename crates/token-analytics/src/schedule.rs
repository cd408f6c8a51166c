//! Schedule Projector
//!
//! Samples the vesting evaluator at whole months to build the circulating
//! supply trajectory over a horizon.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::model::{AllocationSet, Schedule, SchedulePoint};
use crate::{num, vesting};

/// Horizon used when the caller does not pick one.
pub const DEFAULT_HORIZON_MONTHS: u32 = 36;

/// Upper bound on the projection horizon.
pub const MAX_HORIZON_MONTHS: u32 = 120;

/// Project the unlock schedule over `0..=horizon` months.
///
/// Each point carries per-allocation unlocked amounts keyed by name
/// (duplicate names accumulate), the total, and the percent of total
/// supply. The series is monotonically non-decreasing and bounded by the
/// total allocated amount.
pub fn project(set: &AllocationSet, total_supply: Decimal, horizon: u32) -> Schedule {
    let mut points = Vec::with_capacity(horizon as usize + 1);

    for month_offset in 0..=horizon {
        let months = Decimal::from(month_offset);
        let mut per_allocation = BTreeMap::new();
        let mut total_unlocked = Decimal::ZERO;

        for alloc in &set.allocations {
            let unlocked = vesting::unlocked_amount(alloc, months);
            *per_allocation
                .entry(alloc.name.clone())
                .or_insert(Decimal::ZERO) += unlocked;
            total_unlocked += unlocked;
        }

        points.push(SchedulePoint {
            month_offset,
            per_allocation,
            total_unlocked,
            percent: num::pct(total_unlocked, total_supply),
        });
    }

    Schedule { points }
}
