//! Overlays configured holdings onto market records and selects candidates.

use crate::core::config::{FilterConfig, HoldingSpec};
use crate::core::market::AssetRecord;
use crate::core::valuation::{EnrichedRecord, Position};
use tracing::debug;

/// Attaches each holding to the market record with the exact same name,
/// first match wins. Holdings without a matching record are dropped; no
/// synthetic records are created for them.
pub fn overlay_holdings(assets: Vec<AssetRecord>, holdings: &[HoldingSpec]) -> Vec<EnrichedRecord> {
    let mut records: Vec<EnrichedRecord> =
        assets.into_iter().map(EnrichedRecord::from_asset).collect();

    for holding in holdings {
        match records.iter_mut().find(|r| r.asset.name == holding.name) {
            Some(record) => record.position = Some(Position::from(holding)),
            None => debug!("No market record matches holding '{}'", holding.name),
        }
    }

    records
}

/// Selects records that clear the configured thresholds. Held assets and
/// the reference asset always survive, so the portfolio view never drops
/// owned positions.
pub fn filter_candidates(
    records: Vec<EnrichedRecord>,
    filters: &FilterConfig,
) -> Vec<EnrichedRecord> {
    records
        .into_iter()
        .filter(|r| passes_thresholds(&r.asset, filters) || r.asset.is_reference() || r.is_held())
        .collect()
}

/// Threshold check alone, without the held/reference exemptions. Missing
/// optional fields fail their threshold.
pub fn passes_thresholds(asset: &AssetRecord, filters: &FilterConfig) -> bool {
    asset.price_fiat < filters.max_price
        && asset
            .volume_24h_fiat
            .is_some_and(|v| v > filters.min_daily_volume)
        && asset
            .market_cap_fiat
            .is_some_and(|m| m > filters.min_market_cap)
        && asset
            .percent_change_7d
            .is_some_and(|p| p > filters.min_percent_change_7d)
}
