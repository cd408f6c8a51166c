//! Token Risk Metrics
//!
//! Float, dilution, and liquidity ratios with categorical labels, and the
//! counting-rule overall verdict. Thresholds here are the stable external
//! contract; changing any of them is a breaking change.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::MarketSnapshot;
use crate::num;

/// Categorical risk verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// How much of the eventual supply already circulates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatCategory {
    Low,
    Medium,
    High,
}

impl FloatCategory {
    /// Classify circulating-vs-max percent (the token metric bands).
    pub fn from_float_vs_max(p: Decimal) -> Self {
        if p >= dec!(50) {
            Self::High
        } else if p >= dec!(20) {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Classify percent-circulating at present (the narrative bands).
    pub fn from_circulating(p: Decimal) -> Self {
        if p >= dec!(40) {
            Self::High
        } else if p >= dec!(15) {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for FloatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// How far the fully diluted valuation overhangs the market cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overhang {
    Low,
    Moderate,
    High,
}

impl Overhang {
    pub fn from_mc_to_fdv(p: Decimal) -> Self {
        if p > dec!(75) {
            Self::Low
        } else if p >= dec!(30) {
            Self::Moderate
        } else {
            Self::High
        }
    }
}

/// Traded volume relative to a valuation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Liquidity {
    Weak,
    Moderate,
    Strong,
}

impl Liquidity {
    pub fn from_volume_to_mc(p: Decimal) -> Self {
        if p >= dec!(20) {
            Self::Strong
        } else if p >= dec!(10) {
            Self::Moderate
        } else {
            Self::Weak
        }
    }

    pub fn from_volume_to_fdv(p: Decimal) -> Self {
        if p >= dec!(10) {
            Self::Strong
        } else if p >= dec!(5) {
            Self::Moderate
        } else {
            Self::Weak
        }
    }
}

/// Per-token risk ratios and their categorical labels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRiskMetrics {
    /// Circulating supply vs max supply, percent
    pub float_vs_max: Decimal,

    /// Market cap vs fully diluted valuation, percent
    pub mc_to_fdv: Decimal,

    /// 24h volume vs market cap, percent
    pub volume_to_mc: Decimal,

    /// 24h volume vs fully diluted valuation, percent
    pub volume_to_fdv: Decimal,

    pub float_category: FloatCategory,
    pub fdv_overhang: Overhang,
    pub liquidity_mc: Liquidity,
    pub liquidity_fdv: Liquidity,
    pub overall_risk: RiskLevel,
}

impl TokenRiskMetrics {
    /// Worst-case record returned when a computation cannot complete.
    pub fn safe_default() -> Self {
        Self {
            float_vs_max: Decimal::ZERO,
            mc_to_fdv: Decimal::ZERO,
            volume_to_mc: Decimal::ZERO,
            volume_to_fdv: Decimal::ZERO,
            float_category: FloatCategory::Low,
            fdv_overhang: Overhang::High,
            liquidity_mc: Liquidity::Weak,
            liquidity_fdv: Liquidity::Weak,
            overall_risk: RiskLevel::High,
        }
    }
}

/// Compute the full metrics record for one token.
///
/// Fallbacks: total supply falls back to circulating, max supply to
/// total, FDV to market cap, volume to zero. Ratios against an absent
/// divisor default to 100% for the supply-shaped ones and 0% for the
/// volume ones. Overflow yields the safe-defaults record instead of an
/// error.
pub fn evaluate(snapshot: &MarketSnapshot) -> TokenRiskMetrics {
    try_evaluate(snapshot).unwrap_or_else(TokenRiskMetrics::safe_default)
}

fn try_evaluate(snapshot: &MarketSnapshot) -> Option<TokenRiskMetrics> {
    let circulating = snapshot.circulating_supply.max(Decimal::ZERO);
    let total = if snapshot.total_supply > Decimal::ZERO {
        snapshot.total_supply
    } else {
        circulating
    };
    let max_supply = snapshot.max_supply.filter(|m| *m > Decimal::ZERO).unwrap_or(total);
    let market_cap = snapshot.market_cap.max(Decimal::ZERO);
    let fdv = if snapshot.fdv > Decimal::ZERO {
        snapshot.fdv
    } else {
        market_cap
    };
    let volume = snapshot.volume_24h.unwrap_or_default().max(Decimal::ZERO);

    let float_vs_max = checked_pct_or(circulating, max_supply, Decimal::ONE_HUNDRED)?;
    let mc_to_fdv = checked_pct_or(market_cap, fdv, Decimal::ONE_HUNDRED)?;
    let volume_to_mc = checked_pct_or(volume, market_cap, Decimal::ZERO)?;
    let volume_to_fdv = checked_pct_or(volume, fdv, Decimal::ZERO)?;

    Some(TokenRiskMetrics {
        float_vs_max,
        mc_to_fdv,
        volume_to_mc,
        volume_to_fdv,
        float_category: FloatCategory::from_float_vs_max(float_vs_max),
        fdv_overhang: Overhang::from_mc_to_fdv(mc_to_fdv),
        liquidity_mc: Liquidity::from_volume_to_mc(volume_to_mc),
        liquidity_fdv: Liquidity::from_volume_to_fdv(volume_to_fdv),
        overall_risk: overall_risk(float_vs_max, mc_to_fdv, volume_to_mc, volume_to_fdv),
    })
}

/// `(a / b) × 100`, `default` on a non-positive divisor, `None` on overflow.
fn checked_pct_or(a: Decimal, b: Decimal, default: Decimal) -> Option<Decimal> {
    if b <= Decimal::ZERO {
        return Some(default);
    }
    a.checked_div(b)?.checked_mul(Decimal::ONE_HUNDRED)
}

/// Counting-rule verdict over the four ratios.
///
/// Two or more ratios in their danger zone make the token High risk;
/// three or more in their comfort zone make it Low; anything else is
/// Medium.
pub fn overall_risk(
    float_vs_max: Decimal,
    mc_to_fdv: Decimal,
    volume_to_mc: Decimal,
    volume_to_fdv: Decimal,
) -> RiskLevel {
    let risk_count = usize::from(float_vs_max < dec!(20))
        + usize::from(mc_to_fdv < dec!(30))
        + usize::from(volume_to_mc < dec!(10))
        + usize::from(volume_to_fdv < dec!(5));
    let low_count = usize::from(float_vs_max >= dec!(50))
        + usize::from(mc_to_fdv >= dec!(75))
        + usize::from(volume_to_mc >= dec!(20))
        + usize::from(volume_to_fdv >= dec!(10));

    if risk_count >= 2 {
        RiskLevel::High
    } else if low_count >= 3 {
        RiskLevel::Low
    } else {
        RiskLevel::Medium
    }
}

/// Portfolio-level aggregate over a set of token metrics.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskBreakdown {
    pub tokens: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub avg_float_vs_max: Decimal,
    pub avg_mc_to_fdv: Decimal,
    pub overall: RiskLevel,
}

/// Aggregate per-token verdicts into a portfolio view.
///
/// The portfolio reads High when at least half the tokens do, Low when a
/// majority are Low and none are High, Medium otherwise.
pub fn breakdown(metrics: &[TokenRiskMetrics]) -> RiskBreakdown {
    let tokens = metrics.len();
    let high = metrics.iter().filter(|m| m.overall_risk == RiskLevel::High).count();
    let medium = metrics.iter().filter(|m| m.overall_risk == RiskLevel::Medium).count();
    let low = metrics.iter().filter(|m| m.overall_risk == RiskLevel::Low).count();

    let divisor = Decimal::from(tokens.max(1) as u64);
    let avg_float_vs_max = metrics.iter().map(|m| m.float_vs_max).sum::<Decimal>() / divisor;
    let avg_mc_to_fdv = metrics.iter().map(|m| m.mc_to_fdv).sum::<Decimal>() / divisor;

    let overall = if tokens > 0 && high * 2 >= tokens {
        RiskLevel::High
    } else if tokens > 0 && high == 0 && low * 2 > tokens {
        RiskLevel::Low
    } else {
        RiskLevel::Medium
    };

    RiskBreakdown {
        tokens,
        high,
        medium,
        low,
        avg_float_vs_max,
        avg_mc_to_fdv,
        overall,
    }
}
