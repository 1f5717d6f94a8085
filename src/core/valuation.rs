//! Provides cost/value/profit calculations over filtered market records.

use crate::core::config::HoldingSpec;
use crate::core::currency::CostCurrency;
use crate::core::market::AssetRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A portfolio position attached to a market record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub amount: f64,
    pub cost: f64,
    pub cost_currency: CostCurrency,
}

impl From<&HoldingSpec> for Position {
    fn from(holding: &HoldingSpec) -> Self {
        Position {
            amount: holding.amount,
            cost: holding.cost,
            cost_currency: holding.cost_currency,
        }
    }
}

/// Derived cost/value metrics for a position, all costs normalized to BTC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub cost_btc: f64,
    pub value_btc: f64,
    pub value_fiat: f64,
    pub percent_change: f64,
}

/// A market record optionally carrying the owner's position and its
/// valuation. This is what the snapshot persists between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub asset: AssetRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valuation: Option<Valuation>,
}

impl EnrichedRecord {
    pub fn from_asset(asset: AssetRecord) -> Self {
        EnrichedRecord {
            asset,
            position: None,
            valuation: None,
        }
    }

    pub fn is_held(&self) -> bool {
        self.position.is_some()
    }
}

/// Portfolio-wide totals over all records with a priced position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AggregateMetrics {
    pub total_cost_btc: f64,
    pub total_value_btc: f64,
    pub total_value_fiat: f64,
    pub total_percent_change: f64,
}

/// Computes per-record valuations and aggregate totals.
///
/// Pure with respect to its inputs: no state survives between calls. The
/// BTC/fiat rate is taken from the reference asset within `records`; when it
/// is missing, fiat-denominated costs cannot be normalized and those records
/// are skipped from the aggregates.
pub fn valuate(mut records: Vec<EnrichedRecord>) -> (Vec<EnrichedRecord>, AggregateMetrics) {
    let reference_price_fiat = records
        .iter()
        .find(|r| r.asset.is_reference())
        .map(|r| r.asset.price_fiat);

    for record in &mut records {
        record.valuation = valuate_position(record, reference_price_fiat);
    }

    let totals = aggregate(&records);
    (records, totals)
}

fn valuate_position(
    record: &EnrichedRecord,
    reference_price_fiat: Option<f64>,
) -> Option<Valuation> {
    let position = record.position.as_ref()?;
    if position.cost <= 0.0 {
        return None;
    }

    let cost_btc = match position.cost_currency {
        CostCurrency::Btc => position.cost,
        CostCurrency::Fiat => {
            let Some(rate) = reference_price_fiat.filter(|rate| *rate > 0.0) else {
                debug!(
                    "No reference price to normalize fiat cost for {}, skipping",
                    record.asset.name
                );
                return None;
            };
            position.cost / rate
        }
    };

    let value_btc = position.amount * record.asset.price_btc;
    let value_fiat = position.amount * record.asset.price_fiat;
    let percent_change = (value_btc - cost_btc) / cost_btc * 100.0;

    Some(Valuation {
        cost_btc,
        value_btc,
        value_fiat,
        percent_change,
    })
}

/// Folds record valuations into portfolio totals. Also used to rebuild the
/// previous run's totals from a loaded snapshot.
pub fn aggregate(records: &[EnrichedRecord]) -> AggregateMetrics {
    let (total_cost_btc, total_value_btc, total_value_fiat) = records
        .iter()
        .filter_map(|r| r.valuation.as_ref())
        .fold((0.0, 0.0, 0.0), |(cost, value, fiat), v| {
            (cost + v.cost_btc, value + v.value_btc, fiat + v.value_fiat)
        });

    // Ratio of totals, not a sum of per-record percentages: the latter is
    // biased by asset count.
    let total_percent_change = if total_value_btc > 0.0 {
        (total_value_btc - total_cost_btc) / total_value_btc * 100.0
    } else {
        0.0
    };

    AggregateMetrics {
        total_cost_btc,
        total_value_btc,
        total_value_fiat,
        total_percent_change,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::market::REFERENCE_ASSET;

    fn asset(name: &str, price_btc: f64, price_fiat: f64) -> AssetRecord {
        AssetRecord {
            name: name.to_string(),
            price_btc,
            price_fiat,
            volume_24h_fiat: Some(1_000_000.0),
            market_cap_fiat: Some(100_000_000.0),
            percent_change_1h: Some(0.1),
            percent_change_24h: Some(1.0),
            percent_change_7d: Some(5.0),
        }
    }

    fn held(asset: AssetRecord, amount: f64, cost: f64, cost_currency: CostCurrency) -> EnrichedRecord {
        EnrichedRecord {
            asset,
            position: Some(Position {
                amount,
                cost,
                cost_currency,
            }),
            valuation: None,
        }
    }

    #[test]
    fn test_btc_cost_valuation() {
        // 2 units bought for 1.0 BTC, now priced at 0.6 BTC each
        let records = vec![
            EnrichedRecord::from_asset(asset(REFERENCE_ASSET, 1.0, 50000.0)),
            held(asset("Dogecoin", 0.6, 30000.0), 2.0, 1.0, CostCurrency::Btc),
        ];

        let (records, totals) = valuate(records);

        let valuation = records[1].valuation.expect("position should be valued");
        assert!((valuation.value_btc - 1.2).abs() < 1e-9);
        assert!((valuation.value_fiat - 60000.0).abs() < 1e-9);
        assert!((valuation.percent_change - 20.0).abs() < 1e-9);

        assert!((totals.total_cost_btc - 1.0).abs() < 1e-9);
        assert!((totals.total_value_btc - 1.2).abs() < 1e-9);
        // (1.2 - 1.0) / 1.2 * 100
        assert!((totals.total_percent_change - 100.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_fiat_cost_normalized_via_reference_price() {
        let records = vec![
            EnrichedRecord::from_asset(asset(REFERENCE_ASSET, 1.0, 50000.0)),
            held(
                asset("Litecoin", 0.002, 100.0),
                10.0,
                50000.0,
                CostCurrency::Fiat,
            ),
        ];

        let (records, _) = valuate(records);

        let valuation = records[1].valuation.expect("position should be valued");
        // 50000 fiat at a 50000 fiat/BTC rate is exactly 1 BTC
        assert!((valuation.cost_btc - 1.0).abs() < 1e-9);
        assert!((valuation.value_btc - 0.02).abs() < 1e-9);
    }

    #[test]
    fn test_fiat_cost_without_reference_price_is_skipped() {
        let records = vec![held(
            asset("Litecoin", 0.002, 100.0),
            10.0,
            500.0,
            CostCurrency::Fiat,
        )];

        let (records, totals) = valuate(records);

        assert!(records[0].valuation.is_none());
        assert_eq!(totals, AggregateMetrics::default());
    }

    #[test]
    fn test_zero_cost_position_is_not_valued() {
        let records = vec![held(
            asset("Ripple", 0.0001, 0.5),
            100.0,
            0.0,
            CostCurrency::Btc,
        )];

        let (records, totals) = valuate(records);

        assert!(records[0].valuation.is_none());
        assert_eq!(totals.total_value_btc, 0.0);
    }

    #[test]
    fn test_percent_change_identity() {
        let records = vec![
            EnrichedRecord::from_asset(asset(REFERENCE_ASSET, 1.0, 40000.0)),
            held(asset("Monero", 0.01, 400.0), 25.0, 0.2, CostCurrency::Btc),
        ];

        let (records, _) = valuate(records);
        let v = records[1].valuation.unwrap();
        let expected = (v.value_btc - v.cost_btc) / v.cost_btc * 100.0;
        assert!((v.percent_change - expected).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_over_empty_records() {
        let totals = aggregate(&[]);
        assert_eq!(totals, AggregateMetrics::default());
    }

    #[test]
    fn test_aggregate_sums_multiple_positions() {
        let records = vec![
            EnrichedRecord::from_asset(asset(REFERENCE_ASSET, 1.0, 50000.0)),
            held(asset("A", 0.5, 25000.0), 2.0, 0.8, CostCurrency::Btc),
            held(asset("B", 0.1, 5000.0), 5.0, 0.4, CostCurrency::Btc),
        ];

        let (_, totals) = valuate(records);

        assert!((totals.total_cost_btc - 1.2).abs() < 1e-9);
        assert!((totals.total_value_btc - 1.5).abs() < 1e-9);
        assert!((totals.total_value_fiat - 75000.0).abs() < 1e-9);
        assert!((totals.total_percent_change - 20.0).abs() < 1e-9);
    }
}
