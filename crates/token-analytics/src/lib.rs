//! # token-analytics
//!
//! Token float risk and unlock schedule analytics: given a total supply,
//! a launch date, and a set of vesting allocations, compute the monthly
//! circulating-supply trajectory, float/liquidity/dilution risk metrics,
//! and a structured textual risk assessment.
//!
//! ## Pipeline
//!
//! ```text
//! supply + allocations + launch      optional market record
//!            │                                │
//!            ▼                                ▼
//!    vesting evaluator ──► schedule    market-data adapter
//!            │              projector         │
//!            │                  │             ▼
//!            │                  │       risk metrics + verdict
//!            │                  ▼             │
//!            └──────────► narrative ◄─────────┘
//!                              │
//!                              ▼
//!                  AnalyzeOutcome (plain data for renderers)
//! ```
//!
//! ## Design rules
//!
//! - **Pure and deterministic** - `analyze` is a function of its inputs,
//!   re-entrant, bounded O(allocations × horizon), no I/O anywhere.
//! - **Never throws** - invalid input yields a failed outcome with
//!   `warnings`; inconsistent allocations are repaired, not rejected.
//! - **Fixed 30-day months** - schedule arithmetic matches the product's
//!   historical output; the step is the `vesting::MONTH_MS` constant.
//! - **Decimal everywhere** - token amounts and valuations use
//!   `rust_decimal`, never f64.
//!
//! ## Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use token_analytics::{analyze, Allocation, AnalyzeRequest};
//!
//! let request = AnalyzeRequest {
//!     total_supply: dec!(1_000_000),
//!     launch_time: "2024-01-01T00:00:00Z".parse().unwrap(),
//!     horizon_months: Some(12),
//!     allocations: vec![
//!         Allocation::unlocked("Community", dec!(40)),
//!         Allocation::cliff("Team", dec!(60), 12, 6),
//!     ],
//!     market_snapshot: None,
//!     as_of: Some("2024-01-01T00:00:00Z".parse().unwrap()),
//! };
//!
//! let outcome = analyze(&request);
//! assert!(outcome.succeeded());
//! assert_eq!(outcome.current_float_percent, dec!(40));
//! ```

pub mod adapter;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod model;
pub mod narrative;
pub mod num;
pub mod report;
pub mod schedule;
pub mod vesting;

pub use engine::{analyze, analyze_json, AnalyzeOutcome, AnalyzeRequest};
pub use error::{EngineError, Result};
pub use metrics::{FloatCategory, Liquidity, Overhang, RiskLevel, TokenRiskMetrics};
pub use model::{Allocation, AllocationSet, MarketSnapshot, Schedule, SchedulePoint, VestingKind};
pub use report::{Analysis, Item, ItemKind, Section, Severity};
