//! Core business logic abstractions

pub mod config;
pub mod currency;
pub mod history;
pub mod log;
pub mod market;
pub mod portfolio;
pub mod valuation;

// Re-export main types for cleaner imports
pub use currency::{CostCurrency, DecimalPolicy, Fiat};
pub use market::{AssetRecord, REFERENCE_ASSET, TickerProvider};
pub use valuation::{AggregateMetrics, EnrichedRecord};
