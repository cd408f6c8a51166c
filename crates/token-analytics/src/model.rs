//! Domain Models
//!
//! Core data types for tokenomics analysis. Uses `rust_decimal` for all
//! token amounts and valuations - never use f64 for money!
//!
//! Entities are immutable within one engine invocation; edits produce a
//! new `AllocationSet` rather than mutating in place.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::num;

/// How a tranche of tokens unlocks over time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VestingKind {
    /// Fully unlocked from the start.
    None,

    /// Unlocks at a constant rate from launch until the vesting period ends.
    Linear,

    /// Nothing unlocks during the cliff, then linear until the period ends.
    Cliff,
}

/// A named tranche of tokens with its own vesting rule.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    /// Caller-supplied identity; numeric ids are normalized to strings.
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,

    /// Display name (e.g., "Team", "Ecosystem Fund")
    pub name: String,

    /// Share of total supply, 0..=100
    pub percentage: Decimal,

    /// Absolute token amount; kept equal to percentage/100 × total supply
    #[serde(default)]
    pub amount: Decimal,

    /// Vesting rule for this tranche
    #[serde(rename = "vestingType")]
    pub kind: VestingKind,

    /// Vesting period in whole months
    #[serde(default)]
    pub vesting_duration: u32,

    /// Cliff period in whole months (cliff vesting only)
    #[serde(default)]
    pub cliff_duration: u32,
}

/// Ids arrive from JSON as either strings or numbers.
fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

impl Allocation {
    /// A tranche with no vesting - fully unlocked from day one.
    pub fn unlocked(name: impl Into<String>, percentage: Decimal) -> Self {
        Self::build(name, percentage, VestingKind::None, 0, 0)
    }

    /// A linearly vesting tranche over `months`.
    pub fn linear(name: impl Into<String>, percentage: Decimal, months: u32) -> Self {
        Self::build(name, percentage, VestingKind::Linear, months, 0)
    }

    /// A cliff tranche: locked for `cliff` months, then linear until `months`.
    pub fn cliff(name: impl Into<String>, percentage: Decimal, months: u32, cliff: u32) -> Self {
        Self::build(name, percentage, VestingKind::Cliff, months, cliff)
    }

    fn build(
        name: impl Into<String>,
        percentage: Decimal,
        kind: VestingKind,
        vesting_duration: u32,
        cliff_duration: u32,
    ) -> Self {
        let name = name.into();
        Self {
            id: name.to_lowercase().replace(' ', "-"),
            name,
            percentage,
            amount: Decimal::ZERO,
            kind,
            vesting_duration,
            cliff_duration,
        }
    }
}

/// An ordered set of allocations describing the full token distribution.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocationSet {
    pub allocations: Vec<Allocation>,
}

/// Percentage/amount drift above this share of the expected amount is
/// reported as a repair rather than silently absorbed.
const AMOUNT_DRIFT_TOLERANCE: Decimal = dec!(0.000001);

impl AllocationSet {
    pub fn new(allocations: Vec<Allocation>) -> Self {
        Self { allocations }
    }

    /// Sum of allocation percentages.
    pub fn percentage_sum(&self) -> Decimal {
        self.allocations.iter().map(|a| a.percentage).sum()
    }

    /// Enforce the model invariants, returning a repaired set plus one
    /// warning per repair.
    ///
    /// Percentage wins over amount on conflict; a zero percentage with a
    /// nonzero amount derives the percentage instead. Vesting durations
    /// are reconciled with the kind: linear with no duration degrades to
    /// an unlocked tranche, a cliff at least as long as its vesting
    /// period is clamped to one month short of it.
    pub fn normalize(&self, total_supply: Decimal) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let mut repaired = Vec::with_capacity(self.allocations.len());

        for alloc in &self.allocations {
            let mut a = alloc.clone();

            if a.percentage < Decimal::ZERO || a.percentage > Decimal::ONE_HUNDRED {
                warnings.push(format!(
                    "allocation '{}': percentage {} clamped to 0..=100",
                    a.name, a.percentage
                ));
                a.percentage = a.percentage.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
            }

            if a.percentage.is_zero() && a.amount > Decimal::ZERO && total_supply > Decimal::ZERO {
                a.percentage = num::pct(a.amount, total_supply).min(Decimal::ONE_HUNDRED);
                warnings.push(format!(
                    "allocation '{}': percentage derived from amount ({}%)",
                    a.name, a.percentage
                ));
            }

            let expected = a.percentage / Decimal::ONE_HUNDRED * total_supply;
            let drift = (a.amount - expected).abs();
            if a.amount > Decimal::ZERO && drift > expected.abs() * AMOUNT_DRIFT_TOLERANCE {
                warnings.push(format!(
                    "allocation '{}': amount {} rewritten to {} to match percentage",
                    a.name, a.amount, expected
                ));
            }
            a.amount = expected;

            match a.kind {
                VestingKind::None => {
                    if a.vesting_duration != 0 || a.cliff_duration != 0 {
                        warnings.push(format!(
                            "allocation '{}': unlocked tranche carries vesting durations; cleared",
                            a.name
                        ));
                        a.vesting_duration = 0;
                        a.cliff_duration = 0;
                    }
                }
                VestingKind::Linear => {
                    if a.vesting_duration == 0 {
                        warnings.push(format!(
                            "allocation '{}': linear vesting over 0 months treated as fully unlocked",
                            a.name
                        ));
                        a.kind = VestingKind::None;
                        a.cliff_duration = 0;
                    } else if a.cliff_duration != 0 {
                        warnings.push(format!(
                            "allocation '{}': linear vesting has no cliff; cliff cleared",
                            a.name
                        ));
                        a.cliff_duration = 0;
                    }
                }
                VestingKind::Cliff => {
                    if a.vesting_duration == 0 {
                        warnings.push(format!(
                            "allocation '{}': cliff vesting over 0 months treated as fully unlocked",
                            a.name
                        ));
                        a.kind = VestingKind::None;
                        a.cliff_duration = 0;
                    } else if a.cliff_duration >= a.vesting_duration {
                        let clamped = a.vesting_duration - 1;
                        warnings.push(format!(
                            "allocation '{}': cliff {} months must be shorter than vesting {}; clamped to {}",
                            a.name, a.cliff_duration, a.vesting_duration, clamped
                        ));
                        a.cliff_duration = clamped;
                    }
                }
            }

            repaired.push(a);
        }

        let set = Self::new(repaired);
        let sum = set.percentage_sum();
        if sum.is_zero() {
            if !set.allocations.is_empty() {
                warnings.push("allocations cover 0% of supply".into());
            }
        } else if (sum - Decimal::ONE_HUNDRED).abs() > dec!(0.01) {
            warnings.push(format!("allocation percentages sum to {sum}%, not 100%"));
        }

        (set, warnings)
    }

    /// New set with allocation `index` at `percentage`; the amount follows.
    pub fn with_percentage(&self, index: usize, percentage: Decimal, total_supply: Decimal) -> Self {
        let mut next = self.clone();
        if let Some(a) = next.allocations.get_mut(index) {
            a.percentage = percentage.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
            a.amount = a.percentage / Decimal::ONE_HUNDRED * total_supply;
        }
        next
    }

    /// New set with allocation `index` at `amount`; the percentage follows.
    pub fn with_amount(&self, index: usize, amount: Decimal, total_supply: Decimal) -> Self {
        let mut next = self.clone();
        if let Some(a) = next.allocations.get_mut(index) {
            a.amount = amount.max(Decimal::ZERO);
            a.percentage = num::pct(a.amount, total_supply).min(Decimal::ONE_HUNDRED);
        }
        next
    }
}

/// Canonical market data for one token, post-adapter.
///
/// `price`, valuations, and supplies are always concrete after
/// normalization; `max_supply` and `volume_24h` stay optional so the risk
/// metrics can apply their own fallbacks.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    /// Ticker symbol, when the provider sent one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,

    /// Display name, when the provider sent one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Spot price in USD
    pub price: Decimal,

    /// Circulating market capitalization
    pub market_cap: Decimal,

    /// Fully diluted valuation
    pub fdv: Decimal,

    /// 24-hour price change, percent
    pub change_24h: Decimal,

    /// Circulating supply in tokens
    pub circulating_supply: Decimal,

    /// Total supply in tokens
    pub total_supply: Decimal,

    /// Max supply, when the provider distinguishes it from total
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_supply: Option<Decimal>,

    /// 24-hour traded volume in USD
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_24h: Option<Decimal>,
}

/// One month of the projected unlock schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePoint {
    /// Whole months since launch
    pub month_offset: u32,

    /// Unlocked tokens per allocation name (deterministic iteration order)
    pub per_allocation: BTreeMap<String, Decimal>,

    /// Total unlocked tokens across all allocations
    pub total_unlocked: Decimal,

    /// Total unlocked as a percent of total supply
    pub percent: Decimal,
}

/// Month-indexed time series of unlocked amounts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    pub points: Vec<SchedulePoint>,
}

impl Schedule {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total unlocked at month `m`, zero when out of range.
    pub fn total_at(&self, m: usize) -> Decimal {
        self.points.get(m).map_or(Decimal::ZERO, |p| p.total_unlocked)
    }

    /// Percent of supply unlocked at month `m`, zero when out of range.
    pub fn percent_at(&self, m: usize) -> Decimal {
        self.points.get(m).map_or(Decimal::ZERO, |p| p.percent)
    }
}
