pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Watch,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("coinsift starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let base_url = config
        .providers
        .coinmarketcap
        .as_ref()
        .map_or("https://api.coinmarketcap.com", |p| p.base_url.as_str());
    let provider = providers::coinmarketcap::CoinMarketCapProvider::new(base_url);

    match command {
        AppCommand::Watch => cli::watch::run(&config, &provider).await,
    }
}
