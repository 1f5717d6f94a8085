use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use tracing::{debug, instrument};

use crate::core::currency::Fiat;
use crate::core::market::{AssetRecord, TickerProvider};

/// Fetches the public ticker endpoint: one GET per run, no retries.
pub struct CoinMarketCapProvider {
    base_url: String,
}

impl CoinMarketCapProvider {
    pub fn new(base_url: &str) -> Self {
        CoinMarketCapProvider {
            base_url: base_url.to_string(),
        }
    }
}

/// The ticker reports numbers as JSON strings; newer mirrors use plain
/// numbers. Accept both, and treat `null` as absent.
fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Numberish {
        Num(f64),
        Str(String),
    }

    match Option::<Numberish>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Numberish::Num(n)) => Ok(Some(n)),
        Some(Numberish::Str(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Deserialize, Debug)]
struct RawTicker {
    name: String,
    #[serde(default, deserialize_with = "de_opt_f64")]
    price_btc: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    price_usd: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    price_eur: Option<f64>,
    #[serde(default, rename = "24h_volume_usd", deserialize_with = "de_opt_f64")]
    volume_24h_usd: Option<f64>,
    #[serde(default, rename = "24h_volume_eur", deserialize_with = "de_opt_f64")]
    volume_24h_eur: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    market_cap_usd: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    market_cap_eur: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    percent_change_1h: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    percent_change_24h: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    percent_change_7d: Option<f64>,
}

impl RawTicker {
    fn price_fiat(&self, fiat: Fiat) -> Option<f64> {
        match fiat {
            Fiat::Usd => self.price_usd,
            Fiat::Eur => self.price_eur,
        }
    }

    fn volume_24h(&self, fiat: Fiat) -> Option<f64> {
        match fiat {
            Fiat::Usd => self.volume_24h_usd,
            Fiat::Eur => self.volume_24h_eur,
        }
    }

    fn market_cap(&self, fiat: Fiat) -> Option<f64> {
        match fiat {
            Fiat::Usd => self.market_cap_usd,
            Fiat::Eur => self.market_cap_eur,
        }
    }

    fn into_record(self, fiat: Fiat) -> Option<AssetRecord> {
        let price_btc = self.price_btc?;
        let price_fiat = self.price_fiat(fiat)?;
        Some(AssetRecord {
            volume_24h_fiat: self.volume_24h(fiat),
            market_cap_fiat: self.market_cap(fiat),
            percent_change_1h: self.percent_change_1h,
            percent_change_24h: self.percent_change_24h,
            percent_change_7d: self.percent_change_7d,
            name: self.name,
            price_btc,
            price_fiat,
        })
    }
}

#[async_trait]
impl TickerProvider for CoinMarketCapProvider {
    #[instrument(name = "TickerFetch", skip(self), fields(fiat = %fiat))]
    async fn fetch_tickers(&self, fiat: Fiat) -> Result<Vec<AssetRecord>> {
        let url = format!("{}/v1/ticker/?convert={}", self.base_url, fiat.code());
        debug!("Requesting ticker data from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("coinsift/0.1")
            .build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} from ticker API", response.status()));
        }

        let raw: Vec<RawTicker> = response.json().await?;
        debug!("Received {} raw ticker entries", raw.len());

        let records: Vec<AssetRecord> = raw
            .into_iter()
            .filter_map(|ticker| {
                let name = ticker.name.clone();
                let record = ticker.into_record(fiat);
                if record.is_none() {
                    debug!("Skipping '{}': no usable price data", name);
                }
                record
            })
            .collect();

        Ok(records)
    }
}
