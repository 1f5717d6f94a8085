use crate::core::currency::CostCurrency;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// A portfolio position from configuration: how much of an asset is owned
/// and what was paid for it in total.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HoldingSpec {
    pub name: String,
    pub amount: f64,
    pub cost: f64,
    #[serde(default)]
    pub cost_currency: CostCurrency,
}

/// Thresholds a market record must clear to appear in the report.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FilterConfig {
    pub max_price: f64,
    pub min_daily_volume: f64,
    pub min_market_cap: f64,
    pub min_percent_change_7d: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoinMarketCapProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub coinmarketcap: Option<CoinMarketCapProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            coinmarketcap: Some(CoinMarketCapProviderConfig {
                base_url: "https://api.coinmarketcap.com".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub currency: String,
    pub filters: FilterConfig,
    #[serde(default)]
    pub holdings: Vec<HoldingSpec>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub snapshot_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "coinsift", "coinsift")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    /// Where the previous run's snapshot lives. Honors the `snapshot_path`
    /// override, otherwise uses the platform data directory.
    pub fn snapshot_file(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.snapshot_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "coinsift", "coinsift")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().join("snapshot.json"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
