//! Public Facade
//!
//! One pure entry point: inputs in, a self-contained result bundle out.
//! The facade never errors in the normal path; invalid input produces a
//! failed outcome whose `warnings` explain why, and inconsistent
//! allocations are repaired before projection.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::metrics::{self, FloatCategory, TokenRiskMetrics};
use crate::model::{Allocation, AllocationSet, MarketSnapshot, Schedule};
use crate::narrative::{self, NarrativeInput};
use crate::report::Analysis;
use crate::schedule::{self, DEFAULT_HORIZON_MONTHS, MAX_HORIZON_MONTHS};
use crate::{adapter, num, vesting};

/// Engine inputs, deserializable from the external JSON schema.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Total token supply; must be at least 1
    pub total_supply: Decimal,

    /// Launch instant (ISO-8601 in JSON)
    pub launch_time: DateTime<Utc>,

    /// Projection horizon in months; defaults to 36, capped at 120
    #[serde(default)]
    pub horizon_months: Option<i64>,

    /// Token distribution; may be empty
    #[serde(default)]
    pub allocations: Vec<Allocation>,

    /// Raw market record from an external fetch, if any
    #[serde(default)]
    pub market_snapshot: Option<serde_json::Value>,

    /// Evaluation instant for "current" figures; defaults to now.
    /// Supplying it makes the whole invocation deterministic.
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

/// The result bundle handed to renderers.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOutcome {
    /// Percent of total supply circulating at the evaluation instant
    pub current_float_percent: Decimal,

    /// Band of `current_float_percent` under the token metric thresholds
    pub float_class: FloatCategory,

    /// Monthly unlock projection; empty on a failed invocation
    pub schedule: Schedule,

    /// Per-token risk metrics, present when market data was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_risk: Option<TokenRiskMetrics>,

    /// Normalized market data, present when market data was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<MarketSnapshot>,

    /// Structured narrative document
    pub analysis: Analysis,

    /// Repairs, fallbacks, and failures encountered along the way
    pub warnings: Vec<String>,
}

impl AnalyzeOutcome {
    /// Outcome for an invocation that could not produce a schedule.
    fn failed(warnings: Vec<String>) -> Self {
        Self {
            current_float_percent: Decimal::ZERO,
            float_class: FloatCategory::Low,
            schedule: Schedule::default(),
            token_risk: None,
            market: None,
            analysis: Analysis::default(),
            warnings,
        }
    }

    /// Whether the invocation produced a schedule.
    pub fn succeeded(&self) -> bool {
        !self.schedule.is_empty()
    }
}

/// Analyze a token's distribution, unlock trajectory, and market risk.
///
/// Pure and deterministic for fully-specified inputs; work is bounded by
/// `O(allocations × horizon)`. Never panics or returns an error: callers
/// check `succeeded()` (equivalently, a non-empty schedule).
pub fn analyze(request: &AnalyzeRequest) -> AnalyzeOutcome {
    debug!(
        allocations = request.allocations.len(),
        horizon = ?request.horizon_months,
        "analyzing token distribution"
    );

    if let Err(e) = validate(request) {
        warn!(error = %e, "rejecting analysis request");
        return AnalyzeOutcome::failed(vec![e.to_string()]);
    }

    let mut warnings = Vec::new();
    let horizon = effective_horizon(request.horizon_months, &mut warnings);

    let (allocations, repair_warnings) =
        AllocationSet::new(request.allocations.clone()).normalize(request.total_supply);
    warnings.extend(repair_warnings);

    let schedule = schedule::project(&allocations, request.total_supply, horizon);

    let as_of = request.as_of.unwrap_or_else(Utc::now);
    let elapsed = vesting::months_between(request.launch_time, as_of);
    let circulating_now: Decimal = allocations
        .allocations
        .iter()
        .map(|a| vesting::unlocked_amount(a, elapsed))
        .sum();
    let current_float_percent = num::pct(circulating_now, request.total_supply);

    let market = request.market_snapshot.as_ref().map(|raw| {
        let (snapshot, adapter_warnings) = adapter::normalize(raw, Some(request.total_supply));
        warnings.extend(adapter_warnings);
        snapshot
    });
    let token_risk = market.as_ref().map(metrics::evaluate);

    let analysis = narrative::build(&NarrativeInput {
        schedule: &schedule,
        allocations: &allocations,
        market: market.as_ref(),
        total_supply: request.total_supply,
        launch: request.launch_time,
        current_float_percent,
    });

    AnalyzeOutcome {
        current_float_percent,
        float_class: FloatCategory::from_float_vs_max(current_float_percent),
        schedule,
        token_risk,
        market,
        analysis,
        warnings,
    }
}

/// Analyze a raw JSON request, folding parse failures into the outcome.
pub fn analyze_json(raw: &serde_json::Value) -> AnalyzeOutcome {
    match serde_json::from_value::<AnalyzeRequest>(raw.clone()) {
        Ok(request) => analyze(&request),
        Err(e) => AnalyzeOutcome::failed(vec![
            EngineError::MalformedRequest(e.to_string()).to_string(),
        ]),
    }
}

fn validate(request: &AnalyzeRequest) -> Result<(), EngineError> {
    if request.total_supply < Decimal::ONE {
        return Err(EngineError::InvalidSupply(request.total_supply));
    }
    if let Some(h) = request.horizon_months {
        if h < 0 {
            return Err(EngineError::InvalidHorizon(h));
        }
    }
    Ok(())
}

/// Default, then cap the horizon; the cap is a repair, not a failure.
fn effective_horizon(requested: Option<i64>, warnings: &mut Vec<String>) -> u32 {
    let Some(h) = requested else {
        return DEFAULT_HORIZON_MONTHS;
    };
    if h > i64::from(MAX_HORIZON_MONTHS) {
        warnings.push(format!(
            "horizon {h} months capped at {MAX_HORIZON_MONTHS}"
        ));
        return MAX_HORIZON_MONTHS;
    }
    // validate() already rejected negatives.
    h.try_into().unwrap_or(DEFAULT_HORIZON_MONTHS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn launch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn request(allocations: Vec<Allocation>) -> AnalyzeRequest {
        AnalyzeRequest {
            total_supply: dec!(1_000_000),
            launch_time: launch(),
            horizon_months: None,
            allocations,
            market_snapshot: None,
            as_of: Some(launch()),
        }
    }

    #[test]
    fn test_simple_linear_schedule() {
        let mut req = request(vec![Allocation::linear("Team", dec!(100), 10)]);
        req.horizon_months = Some(10);
        req.as_of = Some(launch() + Duration::milliseconds(5 * vesting::MONTH_MS));

        let outcome = analyze(&req);
        assert!(outcome.succeeded());
        assert_eq!(outcome.schedule.len(), 11);
        for k in 0..=10u32 {
            assert_eq!(
                outcome.schedule.total_at(k as usize),
                dec!(100_000) * Decimal::from(k),
                "month {k}"
            );
        }
        // Five 30-day months in: half the supply circulates.
        assert_eq!(outcome.current_float_percent, dec!(50));
        assert_eq!(outcome.float_class, FloatCategory::High);
    }

    #[test]
    fn test_cliff_then_linear_schedule() {
        let mut req = request(vec![Allocation::cliff("All", dec!(100), 12, 6)]);
        req.horizon_months = Some(12);

        let outcome = analyze(&req);
        let total = dec!(1_000_000);
        for m in 0..=5 {
            assert_eq!(outcome.schedule.total_at(m), Decimal::ZERO, "month {m}");
        }
        assert_eq!(outcome.schedule.total_at(6), Decimal::ZERO);
        assert_eq!(outcome.schedule.total_at(9), dec!(0.5) * total);
        assert_eq!(outcome.schedule.total_at(12), total);
    }

    #[test]
    fn test_default_distribution_floats_medium() {
        let req = request(vec![
            Allocation::linear("Team", dec!(32.5), 24),
            Allocation::linear("Investors", dec!(23.26), 36),
            Allocation::unlocked("Community", dec!(27.24)),
            Allocation::unlocked("Liquidity", dec!(11)),
            Allocation::unlocked("Advisors", dec!(2)),
            Allocation::unlocked("Marketing", dec!(3)),
            Allocation::unlocked("Reserve", dec!(1)),
        ]);

        let outcome = analyze(&req);
        assert_eq!(outcome.schedule.total_at(0), dec!(0.4424) * dec!(1_000_000));
        assert_eq!(outcome.current_float_percent, dec!(44.2400));
        assert_eq!(outcome.float_class, FloatCategory::Medium);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_market_snapshot_enables_risk_and_market_sections() {
        let mut req = request(vec![Allocation::unlocked("All", dec!(100))]);
        req.market_snapshot = Some(serde_json::json!({
            "symbol": "tkn",
            "price": 2.0,
            "market_cap": 1_000_000_000.0,
            "fully_diluted_valuation": 2_000_000_000.0,
            "circulating_supply": 500_000_000.0,
            "total_supply": 1_000_000_000.0,
            "total_volume": 250_000_000.0
        }));

        let outcome = analyze(&req);
        let risk = outcome.token_risk.expect("risk metrics");
        assert_eq!(risk.float_vs_max, dec!(50));
        assert_eq!(risk.mc_to_fdv, dec!(50));
        assert!(outcome.analysis.section("Market context").is_some());
        assert!(outcome.analysis.section("Market-cap milestones").is_some());
    }

    #[test]
    fn test_invalid_supply_fails_without_schedule() {
        let mut req = request(vec![Allocation::unlocked("All", dec!(100))]);
        req.total_supply = Decimal::ZERO;

        let outcome = analyze(&req);
        assert!(!outcome.succeeded());
        assert!(outcome.schedule.is_empty());
        assert!(outcome.analysis.sections.is_empty());
        assert!(outcome.warnings[0].contains("invalid total supply"));
    }

    #[test]
    fn test_negative_horizon_fails_but_large_horizon_is_capped() {
        let mut req = request(vec![Allocation::unlocked("All", dec!(100))]);
        req.horizon_months = Some(-1);
        assert!(!analyze(&req).succeeded());

        req.horizon_months = Some(240);
        let outcome = analyze(&req);
        assert!(outcome.succeeded());
        assert_eq!(outcome.schedule.len(), 121);
        assert!(outcome.warnings.iter().any(|w| w.contains("capped at 120")));
    }

    #[test]
    fn test_empty_allocations_float_low() {
        let outcome = analyze(&request(Vec::new()));
        assert!(outcome.succeeded());
        assert_eq!(outcome.current_float_percent, Decimal::ZERO);
        assert_eq!(outcome.float_class, FloatCategory::Low);
        for point in &outcome.schedule.points {
            assert_eq!(point.total_unlocked, Decimal::ZERO);
        }
    }

    #[test]
    fn test_repairs_are_reported() {
        let outcome = analyze(&request(vec![Allocation::cliff("Bad", dec!(100), 6, 9)]));
        assert!(outcome.succeeded());
        assert!(outcome.warnings.iter().any(|w| w.contains("clamped to 5")));
    }

    #[test]
    fn test_equal_inputs_produce_byte_equal_outputs() {
        let mut req = request(vec![
            Allocation::unlocked("Liquid", dec!(40)),
            Allocation::cliff("Investors", dec!(60), 18, 6),
        ]);
        req.market_snapshot = Some(serde_json::json!({ "price": 0.5, "total_supply": 1_000_000.0 }));

        let a = serde_json::to_string(&analyze(&req)).unwrap();
        let b = serde_json::to_string(&analyze(&req)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_analyze_json_reports_malformed_requests() {
        let outcome = analyze_json(&serde_json::json!({
            "totalSupply": 1_000_000,
            "launchTime": "not-a-timestamp"
        }));
        assert!(!outcome.succeeded());
        assert!(outcome.warnings[0].contains("malformed request"));
    }

    #[test]
    fn test_analyze_json_accepts_schema_field_names() {
        let outcome = analyze_json(&serde_json::json!({
            "totalSupply": 1_000_000,
            "launchTime": "2024-01-01T00:00:00Z",
            "horizonMonths": 10,
            "asOf": "2024-01-01T00:00:00Z",
            "allocations": [{
                "id": 1,
                "name": "Team",
                "percentage": 100,
                "vestingType": "linear",
                "vestingDuration": 10
            }]
        }));
        assert!(outcome.succeeded());
        assert_eq!(outcome.schedule.total_at(10), dec!(1_000_000));
    }
}
