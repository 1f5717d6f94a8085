//! Compares the current run against the previously persisted snapshot.

use crate::core::valuation::{AggregateMetrics, EnrichedRecord, aggregate};
use crate::store::Snapshot;
use std::collections::HashMap;

/// Direction of a metric relative to its prior-snapshot value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn classify(current: f64, prior: f64) -> Self {
        if current == prior {
            Trend::Flat
        } else if current > prior {
            Trend::Up
        } else {
            Trend::Down
        }
    }
}

/// A trend with the numeric movement that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricDelta {
    pub trend: Trend,
    pub delta: f64,
}

impl MetricDelta {
    fn between(current: f64, prior: f64) -> Self {
        MetricDelta {
            trend: Trend::classify(current, prior),
            delta: current - prior,
        }
    }
}

/// Per-asset movement of profit percentage and BTC value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetComparison {
    pub percent_change: MetricDelta,
    pub value_btc: MetricDelta,
}

/// Aggregate-level movement over portfolio totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TotalsComparison {
    pub percent_change: MetricDelta,
    pub value_btc: MetricDelta,
}

/// Result of diffing the current run against the prior snapshot. On a first
/// run (no snapshot) every lookup is absent; nothing is reported as zero.
#[derive(Debug, Default)]
pub struct HistoryComparison {
    per_asset: HashMap<String, AssetComparison>,
    pub totals: Option<TotalsComparison>,
    pub prior_totals: Option<AggregateMetrics>,
}

impl HistoryComparison {
    pub fn for_asset(&self, name: &str) -> Option<&AssetComparison> {
        self.per_asset.get(name)
    }

    pub fn is_first_run(&self) -> bool {
        self.prior_totals.is_none()
    }
}

/// Joins current records against the snapshot by asset name. Positional
/// matching would silently misalign when the market ordering shifts
/// between runs.
pub fn compare(
    current: &[EnrichedRecord],
    current_totals: &AggregateMetrics,
    snapshot: Option<&Snapshot>,
) -> HistoryComparison {
    let Some(snapshot) = snapshot else {
        return HistoryComparison::default();
    };

    let prior_by_name: HashMap<&str, &EnrichedRecord> = snapshot
        .records
        .iter()
        .map(|r| (r.asset.name.as_str(), r))
        .collect();

    let per_asset = current
        .iter()
        .filter_map(|record| {
            let valuation = record.valuation.as_ref()?;
            let prior = prior_by_name.get(record.asset.name.as_str())?;
            let prior_valuation = prior.valuation.as_ref()?;
            Some((
                record.asset.name.clone(),
                AssetComparison {
                    percent_change: MetricDelta::between(
                        valuation.percent_change,
                        prior_valuation.percent_change,
                    ),
                    value_btc: MetricDelta::between(valuation.value_btc, prior_valuation.value_btc),
                },
            ))
        })
        .collect();

    let prior_totals = aggregate(&snapshot.records);
    let totals = TotalsComparison {
        percent_change: MetricDelta::between(
            current_totals.total_percent_change,
            prior_totals.total_percent_change,
        ),
        value_btc: MetricDelta::between(
            current_totals.total_value_btc,
            prior_totals.total_value_btc,
        ),
    };

    HistoryComparison {
        per_asset,
        totals: Some(totals),
        prior_totals: Some(prior_totals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CostCurrency;
    use crate::core::market::AssetRecord;
    use crate::core::valuation::{Position, Valuation, valuate};
    use chrono::Utc;

    fn record(name: &str, price_btc: f64, cost_btc: f64, amount: f64) -> EnrichedRecord {
        EnrichedRecord {
            asset: AssetRecord {
                name: name.to_string(),
                price_btc,
                price_fiat: price_btc * 50000.0,
                volume_24h_fiat: Some(100_000.0),
                market_cap_fiat: Some(10_000_000.0),
                percent_change_1h: None,
                percent_change_24h: None,
                percent_change_7d: Some(1.0),
            },
            position: Some(Position {
                amount,
                cost: cost_btc,
                cost_currency: CostCurrency::Btc,
            }),
            valuation: Some(Valuation {
                cost_btc,
                value_btc: amount * price_btc,
                value_fiat: amount * price_btc * 50000.0,
                percent_change: (amount * price_btc - cost_btc) / cost_btc * 100.0,
            }),
        }
    }

    fn snapshot(records: Vec<EnrichedRecord>) -> Snapshot {
        Snapshot {
            saved_at: Utc::now(),
            records,
        }
    }

    #[test]
    fn test_first_run_has_no_comparisons() {
        let current = vec![record("Dogecoin", 0.001, 0.05, 100.0)];
        let (current, totals) = valuate(current);

        let comparison = compare(&current, &totals, None);

        assert!(comparison.is_first_run());
        assert!(comparison.totals.is_none());
        assert!(comparison.for_asset("Dogecoin").is_none());
    }

    #[test]
    fn test_improving_asset_classified_up() {
        let prior = snapshot(vec![record("Dogecoin", 0.001, 0.05, 100.0)]);
        let current = vec![record("Dogecoin", 0.002, 0.05, 100.0)];
        let totals = aggregate(&current);

        let comparison = compare(&current, &totals, Some(&prior));

        let asset = comparison.for_asset("Dogecoin").expect("asset compared");
        assert_eq!(asset.percent_change.trend, Trend::Up);
        assert_eq!(asset.value_btc.trend, Trend::Up);
        assert!((asset.value_btc.delta - 0.1).abs() < 1e-9);
        assert_eq!(comparison.totals.unwrap().value_btc.trend, Trend::Up);
    }

    #[test]
    fn test_unchanged_asset_classified_flat() {
        let prior = snapshot(vec![record("Dogecoin", 0.001, 0.05, 100.0)]);
        let current = vec![record("Dogecoin", 0.001, 0.05, 100.0)];
        let totals = aggregate(&current);

        let comparison = compare(&current, &totals, Some(&prior));

        let asset = comparison.for_asset("Dogecoin").unwrap();
        assert_eq!(asset.percent_change.trend, Trend::Flat);
        assert_eq!(asset.value_btc.delta, 0.0);
        let totals_cmp = comparison.totals.unwrap();
        assert_eq!(totals_cmp.percent_change.trend, Trend::Flat);
        assert_eq!(totals_cmp.value_btc.trend, Trend::Flat);
    }

    #[test]
    fn test_join_is_by_name_not_position() {
        // Snapshot ordering differs from the current run; the join must not
        // pair records positionally.
        let prior = snapshot(vec![
            record("Ripple", 0.0001, 0.01, 500.0),
            record("Dogecoin", 0.001, 0.05, 100.0),
        ]);
        let current = vec![
            record("Dogecoin", 0.0005, 0.05, 100.0),
            record("Ripple", 0.0001, 0.01, 500.0),
        ];
        let totals = aggregate(&current);

        let comparison = compare(&current, &totals, Some(&prior));

        assert_eq!(
            comparison.for_asset("Dogecoin").unwrap().value_btc.trend,
            Trend::Down
        );
        assert_eq!(
            comparison.for_asset("Ripple").unwrap().value_btc.trend,
            Trend::Flat
        );
    }

    #[test]
    fn test_asset_missing_from_snapshot_has_no_comparison() {
        let prior = snapshot(vec![record("Dogecoin", 0.001, 0.05, 100.0)]);
        let current = vec![
            record("Dogecoin", 0.001, 0.05, 100.0),
            record("Newcoin", 0.0002, 0.01, 50.0),
        ];
        let totals = aggregate(&current);

        let comparison = compare(&current, &totals, Some(&prior));

        assert!(comparison.for_asset("Dogecoin").is_some());
        assert!(comparison.for_asset("Newcoin").is_none());
    }

    #[test]
    fn test_prior_totals_recomputed_from_snapshot() {
        let prior = snapshot(vec![record("Dogecoin", 0.001, 0.05, 100.0)]);
        let current = vec![record("Dogecoin", 0.002, 0.05, 100.0)];
        let totals = aggregate(&current);

        let comparison = compare(&current, &totals, Some(&prior));

        let prior_totals = comparison.prior_totals.unwrap();
        assert!((prior_totals.total_value_btc - 0.1).abs() < 1e-9);
        assert!((prior_totals.total_cost_btc - 0.05).abs() < 1e-9);
    }
}
