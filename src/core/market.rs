//! Market data abstractions and core types

use crate::core::currency::Fiat;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The asset whose price defines the BTC/fiat exchange rate. It is always
/// retained by the candidate filter so valuation can normalize fiat costs.
pub const REFERENCE_ASSET: &str = "Bitcoin";

/// One asset as reported by the ticker, normalized to the active fiat
/// currency. Percent changes, volume and market cap may be absent for
/// thinly traded assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub name: String,
    pub price_btc: f64,
    pub price_fiat: f64,
    pub volume_24h_fiat: Option<f64>,
    pub market_cap_fiat: Option<f64>,
    pub percent_change_1h: Option<f64>,
    pub percent_change_24h: Option<f64>,
    pub percent_change_7d: Option<f64>,
}

impl AssetRecord {
    pub fn is_reference(&self) -> bool {
        self.name == REFERENCE_ASSET
    }
}

#[async_trait]
pub trait TickerProvider: Send + Sync {
    /// Fetches the full market snapshot with fiat fields converted to `fiat`.
    async fn fetch_tickers(&self, fiat: Fiat) -> Result<Vec<AssetRecord>>;
}
