//! Narrative Generator
//!
//! Turns the schedule, allocation set, and optional market snapshot into
//! a structured, deterministic analysis document. Section order is fixed;
//! market-dependent sections are omitted when no snapshot is present.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::metrics::FloatCategory;
use crate::model::{AllocationSet, MarketSnapshot, Schedule, VestingKind};
use crate::num::{format_market_value, format_price, format_token_count, pct};
use crate::report::{Analysis, Item, Section, Severity};
use crate::vesting::MONTH_MS;

/// A monthly release above this percent of total supply is a key unlock
/// event.
pub const UNLOCK_EVENT_THRESHOLD_PCT: Decimal = dec!(5);

/// At most this many unlock events are reported, earliest first.
pub const MAX_UNLOCK_EVENTS: usize = 3;

/// Market-cap multipliers enumerated in the milestones section.
pub const MILESTONE_MULTIPLIERS: [u32; 4] = [2, 5, 10, 25];

/// Everything the generator reads; all references, nothing is mutated.
pub struct NarrativeInput<'a> {
    pub schedule: &'a Schedule,
    pub allocations: &'a AllocationSet,
    pub market: Option<&'a MarketSnapshot>,
    pub total_supply: Decimal,
    pub launch: DateTime<Utc>,
    pub current_float_percent: Decimal,
}

/// Build the full analysis document.
pub fn build(input: &NarrativeInput<'_>) -> Analysis {
    let mut analysis = Analysis::default();
    analysis.push_section(header(input));
    if let Some(market) = input.market {
        analysis.push_section(market_context(market));
    }
    analysis.push_section(supply_dynamics(input));
    if let Some(market) = input.market {
        analysis.push_section(market_impact(input, market));
    }
    analysis.push_section(vesting_structure(input));
    analysis.push_section(concentration(input));
    analysis.push_section(unlock_schedule(input));
    if let Some(market) = input.market {
        analysis.push_section(milestones(market));
    }
    analysis
}

fn header(input: &NarrativeInput<'_>) -> Section {
    let band = FloatCategory::from_circulating(input.current_float_percent);
    let mut section = Section::new("Overview");
    section.push(Item::para(format!(
        "Float is {band} with {:.2}% of total supply currently in circulation.",
        input.current_float_percent
    )));
    section
}

fn market_context(market: &MarketSnapshot) -> Section {
    let mut section = Section::new("Market context");
    let label = match (&market.name, &market.symbol) {
        (Some(name), Some(symbol)) => format!("{name} ({})", symbol.to_uppercase()),
        (Some(name), None) => name.clone(),
        (None, Some(symbol)) => symbol.to_uppercase(),
        (None, None) => "The token".into(),
    };
    section.push(Item::para(format!(
        "{label} trades at {}.",
        format_price(market.price)
    )));
    section.push(Item::bullet(format!(
        "Market cap {}",
        format_market_value(market.market_cap)
    )));
    section.push(Item::bullet(format!(
        "Fully diluted valuation {}",
        format_market_value(market.fdv)
    )));
    if !market.change_24h.is_zero() {
        let sign = if market.change_24h > Decimal::ZERO { "+" } else { "" };
        section.push(Item::bullet(format!(
            "24h change {sign}{:.2}%",
            market.change_24h
        )));
    }
    section
}

/// Supply growth between two schedule points, relative to the first.
fn inflation_between(schedule: &Schedule, from: usize, to: usize) -> Decimal {
    let base = schedule.total_at(from);
    if base <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    pct(schedule.total_at(to) - base, base)
}

/// Index of the last point at or before `months`.
fn capped_index(schedule: &Schedule, months: usize) -> usize {
    months.min(schedule.len().saturating_sub(1))
}

fn supply_dynamics(input: &NarrativeInput<'_>) -> Section {
    let schedule = input.schedule;
    let mut section = Section::new("Supply dynamics");

    let next_month = inflation_between(schedule, 0, capped_index(schedule, 1));
    let six_month = inflation_between(schedule, 0, capped_index(schedule, 6));
    let one_year_index = capped_index(schedule, 12);

    if next_month >= dec!(5) {
        section.push(
            Item::bullet(format!(
                "High short-term inflation risk: circulating supply grows {next_month:.2}% next month"
            ))
            .with_severity(Severity::Warn),
        );
    } else {
        section.push(Item::bullet(format!(
            "Next-month supply growth is {next_month:.2}%"
        )));
    }

    let (six_label, six_severity) = if six_month > dec!(50) {
        ("Significant", Severity::Warn)
    } else if six_month > dec!(20) {
        ("Moderate", Severity::Info)
    } else {
        ("Low", Severity::Info)
    };
    section.push(
        Item::bullet(format!(
            "{six_label} six-month dilution: supply grows {six_month:.2}%"
        ))
        .with_severity(six_severity),
    );

    section.push(Item::bullet(format!(
        "In 12 months, {:.2}% of total supply is projected to circulate",
        schedule.percent_at(one_year_index)
    )));

    section
}

fn market_impact(input: &NarrativeInput<'_>, market: &MarketSnapshot) -> Section {
    let schedule = input.schedule;
    let mut section = Section::new("Market impact");

    let one_year_index = capped_index(schedule, 12);
    let one_year_inflation = inflation_between(schedule, 0, one_year_index);

    if market.price > Decimal::ZERO {
        let projected_cap = market.price * schedule.total_at(one_year_index);
        section.push(Item::bullet(format!(
            "At the current price, circulating market cap reaches {} in 12 months",
            format_market_value(projected_cap)
        )));

        let divisor = Decimal::ONE + one_year_inflation / Decimal::ONE_HUNDRED;
        if divisor > Decimal::ZERO {
            section.push(Item::bullet(format!(
                "Holding market cap constant, dilution implies a price of {}",
                format_price(market.price / divisor)
            )));
        }
    }

    if market.market_cap > Decimal::ZERO {
        let ratio = market.fdv / market.market_cap;
        if ratio > dec!(3) {
            section.push(
                Item::bullet(format!(
                    "FDV is {ratio:.1}x market cap; substantial future dilution is not yet priced in"
                ))
                .with_severity(Severity::Warn),
            );
        }
    }

    section
}

fn vesting_structure(input: &NarrativeInput<'_>) -> Section {
    let allocations = &input.allocations.allocations;
    let mut section = Section::new("Vesting structure");
    if allocations.is_empty() {
        return section;
    }

    let unvested_count = allocations.iter().filter(|a| a.kind == VestingKind::None).count();
    let linear_count = allocations.iter().filter(|a| a.kind == VestingKind::Linear).count();
    let cliff_count = allocations.iter().filter(|a| a.kind == VestingKind::Cliff).count();
    section.push(Item::para(format!(
        "{} allocations: {unvested_count} fully unlocked, {linear_count} linear, {cliff_count} cliff.",
        allocations.len()
    )));

    let unvested_percent: Decimal = allocations
        .iter()
        .filter(|a| a.kind == VestingKind::None)
        .map(|a| a.percentage)
        .sum();
    if unvested_percent > dec!(30) {
        section.push(
            Item::bullet(format!(
                "{unvested_percent:.2}% of supply is unlocked from day one; high sell pressure risk"
            ))
            .with_severity(Severity::Warn),
        );
    } else {
        section.push(Item::bullet(format!(
            "{unvested_percent:.2}% of supply is unlocked from day one"
        )));
    }

    if let Some(longest) = allocations.iter().map(|a| a.vesting_duration).max() {
        if longest > 0 {
            section.push(Item::bullet(format!(
                "Longest vesting schedule runs {longest} months"
            )));
        }
    }

    section
}

fn concentration(input: &NarrativeInput<'_>) -> Section {
    let mut section = Section::new("Supply concentration");
    let Some(largest) = input
        .allocations
        .allocations
        .iter()
        .max_by_key(|a| a.percentage)
    else {
        return section;
    };

    if largest.percentage > dec!(30) {
        section.push(
            Item::bullet(format!(
                "Largest allocation '{}' holds {:.2}% of supply; concentrated ownership",
                largest.name, largest.percentage
            ))
            .with_severity(Severity::Warn),
        );
    } else {
        section.push(Item::bullet(format!(
            "Largest allocation '{}' holds {:.2}% of supply",
            largest.name, largest.percentage
        )));
    }
    section
}

fn unlock_schedule(input: &NarrativeInput<'_>) -> Section {
    let schedule = input.schedule;
    let mut section = Section::new("Unlock schedule");
    if schedule.len() < 2 {
        return section;
    }

    let mut reported = 0usize;
    for m in 1..schedule.len() {
        let released = schedule.total_at(m) - schedule.total_at(m - 1);
        let released_pct = pct(released, input.total_supply);
        if released_pct <= UNLOCK_EVENT_THRESHOLD_PCT {
            continue;
        }
        let date = event_date(input.launch, m);
        section.push(
            Item::bullet(format!(
                "Month {m} ({}): {released_pct:.2}% of supply unlocks ({} tokens)",
                date.format("%Y-%m-%d"),
                format_token_count(released)
            ))
            .with_severity(Severity::Alert),
        );
        reported += 1;
        if reported == MAX_UNLOCK_EVENTS {
            break;
        }
    }

    if reported == 0 {
        section.push(Item::para(format!(
            "Supply unlocks gradually; no single month releases more than {UNLOCK_EVENT_THRESHOLD_PCT}% of total supply."
        )));
    }
    section
}

/// Absolute date of schedule month `m` (launch plus m fixed months).
fn event_date(launch: DateTime<Utc>, m: usize) -> DateTime<Utc> {
    launch + Duration::milliseconds(m as i64 * MONTH_MS)
}

fn milestones(market: &MarketSnapshot) -> Section {
    let mut section = Section::new("Market-cap milestones");
    if market.price <= Decimal::ZERO || market.market_cap <= Decimal::ZERO {
        return section;
    }

    for multiplier in MILESTONE_MULTIPLIERS {
        let factor = Decimal::from(multiplier);
        section.push(Item::bullet(format!(
            "{multiplier}x: market cap {} at {}",
            format_market_value(market.market_cap * factor),
            format_price(market.price * factor)
        )));
    }
    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Allocation;
    use crate::schedule::project;
    use chrono::TimeZone;

    fn launch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn analysis_for(
        allocations: Vec<Allocation>,
        total: Decimal,
        market: Option<&MarketSnapshot>,
    ) -> Analysis {
        let set = AllocationSet::new(allocations).normalize(total).0;
        let schedule = project(&set, total, 36);
        let current = schedule.percent_at(0);
        build(&NarrativeInput {
            schedule: &schedule,
            allocations: &set,
            market,
            total_supply: total,
            launch: launch(),
            current_float_percent: current,
        })
    }

    #[test]
    fn test_market_sections_omitted_without_snapshot() {
        let analysis = analysis_for(
            vec![Allocation::linear("Team", dec!(100), 12)],
            dec!(1_000_000),
            None,
        );
        assert!(analysis.section("Market context").is_none());
        assert!(analysis.section("Market impact").is_none());
        assert!(analysis.section("Market-cap milestones").is_none());
        assert!(analysis.section("Overview").is_some());
        assert!(analysis.section("Supply dynamics").is_some());
    }

    #[test]
    fn test_cliff_release_is_reported_as_alert() {
        // Entire supply unlocks between month 6 and month 7.
        let analysis = analysis_for(
            vec![Allocation::cliff("Investors", dec!(100), 7, 6)],
            dec!(1_000_000),
            None,
        );
        let section = analysis.section("Unlock schedule").unwrap();
        let event = &section.items[0];
        assert_eq!(event.severity, Some(Severity::Alert));
        assert!(event.text.starts_with("Month 7 ("), "got: {}", event.text);
        // 7 fixed 30-day months (210 days) after 2024-01-01 is 2024-07-29.
        assert!(event.text.contains("2024-07-29"), "got: {}", event.text);
        assert!(event.text.contains("100.00% of supply"));
        assert!(event.text.contains("1,000,000 tokens"));
    }

    #[test]
    fn test_gradual_schedule_reports_no_events() {
        let analysis = analysis_for(
            vec![Allocation::linear("Team", dec!(100), 36)],
            dec!(1_000_000),
            None,
        );
        let section = analysis.section("Unlock schedule").unwrap();
        assert_eq!(section.items.len(), 1);
        assert!(section.items[0].text.contains("gradually"));
    }

    #[test]
    fn test_events_capped_at_three_earliest() {
        // Four separate cliffs, each releasing 25% in one month.
        let analysis = analysis_for(
            vec![
                Allocation::cliff("A", dec!(25), 3, 2),
                Allocation::cliff("B", dec!(25), 6, 5),
                Allocation::cliff("C", dec!(25), 9, 8),
                Allocation::cliff("D", dec!(25), 12, 11),
            ],
            dec!(1_000_000),
            None,
        );
        let section = analysis.section("Unlock schedule").unwrap();
        assert_eq!(section.items.len(), 3);
        assert!(section.items[0].text.starts_with("Month 3"));
        assert!(section.items[2].text.starts_with("Month 9"));
    }

    #[test]
    fn test_milestone_table() {
        let market = MarketSnapshot {
            price: dec!(2),
            market_cap: dec!(1_000_000_000),
            fdv: dec!(1_500_000_000),
            ..MarketSnapshot::default()
        };
        let analysis = analysis_for(
            vec![Allocation::unlocked("All", dec!(100))],
            dec!(500_000_000),
            Some(&market),
        );
        let section = analysis.section("Market-cap milestones").unwrap();
        assert_eq!(section.items.len(), 4);
        assert!(section.items[0].text.contains("$2.00B"));
        assert!(section.items[0].text.contains("$4.00"));
        assert!(section.items[3].text.contains("$25.00B"));
        assert!(section.items[3].text.contains("$50.00"));
    }

    #[test]
    fn test_inflation_bullets_and_thresholds() {
        // Linear over 10 months from a 10% liquid base: month 1 adds 9%
        // of supply on a 10% base, i.e. 90% next-month inflation.
        let analysis = analysis_for(
            vec![
                Allocation::unlocked("Liquid", dec!(10)),
                Allocation::linear("Team", dec!(90), 10),
            ],
            dec!(1_000_000),
            None,
        );
        let section = analysis.section("Supply dynamics").unwrap();
        assert!(section.items[0].text.contains("High short-term inflation risk"));
        assert_eq!(section.items[0].severity, Some(Severity::Warn));
        assert!(section.items[1].text.starts_with("Significant"));
        assert!(section.items[2].text.contains("100.00% of total supply"));
    }

    #[test]
    fn test_sell_pressure_and_concentration_flags() {
        let analysis = analysis_for(
            vec![
                Allocation::unlocked("Community", dec!(60)),
                Allocation::linear("Team", dec!(40), 24),
            ],
            dec!(1_000_000),
            None,
        );
        let vesting = analysis.section("Vesting structure").unwrap();
        assert!(vesting.items.iter().any(|i| i.text.contains("high sell pressure")));
        let conc = analysis.section("Supply concentration").unwrap();
        assert_eq!(conc.items[0].severity, Some(Severity::Warn));
        assert!(conc.items[0].text.contains("Community"));
    }

    #[test]
    fn test_deterministic_output() {
        let market = MarketSnapshot {
            price: dec!(1),
            market_cap: dec!(1_000_000),
            fdv: dec!(4_000_000),
            ..MarketSnapshot::default()
        };
        let allocations = vec![
            Allocation::unlocked("Liquid", dec!(30)),
            Allocation::cliff("Investors", dec!(70), 18, 6),
        ];
        let a = analysis_for(allocations.clone(), dec!(1_000_000), Some(&market));
        let b = analysis_for(allocations, dec!(1_000_000), Some(&market));
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
