//! Market-Data Adapter
//!
//! Normalizes a loosely-typed record from an external price API into the
//! canonical `MarketSnapshot`. Pure data shaping: nothing is rejected,
//! missing fields get conservative defaults and a warning. Fetching the
//! record is the caller's concern.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tracing::debug;

use crate::model::MarketSnapshot;
use crate::num;

/// Share of total supply assumed circulating when the provider omits it.
const ASSUMED_CIRCULATING_SHARE: Decimal = dec!(0.2);

/// Normalize `raw` into a canonical snapshot.
///
/// `engine_total_supply` backstops the supply cascade when the record
/// carries neither a total nor a circulating supply. Both snake_case and
/// camelCase provider keys are accepted.
pub fn normalize(raw: &Value, engine_total_supply: Option<Decimal>) -> (MarketSnapshot, Vec<String>) {
    let mut warnings = Vec::new();

    let price = match field(raw, &["price", "current_price", "currentPrice"]) {
        Some(p) => p,
        None => {
            warnings.push("market data: price missing, defaulting to 0".into());
            Decimal::ZERO
        }
    };

    let raw_total = field(raw, &["total_supply", "totalSupply"]);
    let raw_circulating = field(raw, &["circulating_supply", "circulatingSupply"]);

    let total_supply = match raw_total.or(raw_circulating).or(engine_total_supply) {
        Some(t) => {
            if raw_total.is_none() {
                warnings.push("market data: total supply missing, using fallback".into());
            }
            t
        }
        None => {
            warnings.push("market data: no supply figures available".into());
            Decimal::ZERO
        }
    };

    let circulating_supply = match raw_circulating {
        Some(c) => c,
        None => {
            warnings.push(format!(
                "market data: circulating supply missing, assuming {}% of total",
                ASSUMED_CIRCULATING_SHARE * Decimal::ONE_HUNDRED
            ));
            total_supply * ASSUMED_CIRCULATING_SHARE
        }
    };

    let market_cap = match field(raw, &["market_cap", "marketCap"]) {
        Some(mc) => mc,
        None => {
            warnings.push("market data: market cap synthesized from circulating supply × price".into());
            circulating_supply * price
        }
    };

    let fdv = match field(raw, &["fully_diluted_valuation", "fdv"]) {
        Some(f) => f,
        None => {
            warnings.push(
                "market data: FDV synthesized from total supply × price; dilution may be under-reported"
                    .into(),
            );
            total_supply * price
        }
    };

    let snapshot = MarketSnapshot {
        symbol: text(raw, &["symbol"]),
        name: text(raw, &["name"]),
        price,
        market_cap,
        fdv,
        change_24h: field(raw, &["price_change_percentage_24h", "change24h"]).unwrap_or_default(),
        circulating_supply,
        total_supply,
        max_supply: field(raw, &["max_supply", "maxSupply"]),
        volume_24h: field(raw, &["total_volume", "volume_24h", "volume24h"]),
    };

    debug!(
        symbol = snapshot.symbol.as_deref().unwrap_or("?"),
        warnings = warnings.len(),
        "normalized market record"
    );

    (snapshot, warnings)
}

/// First present, parseable numeric field among `keys`.
fn field(raw: &Value, keys: &[&str]) -> Option<Decimal> {
    keys.iter().find_map(|k| raw.get(k).and_then(num::to_decimal))
}

fn text(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| raw.get(k).and_then(Value::as_str))
        .map(str::to_owned)
}
