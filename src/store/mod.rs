//! Persists the enriched record set between runs for trend comparison.

use crate::core::valuation::{AggregateMetrics, EnrichedRecord, aggregate};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// The previous run's enriched records. Fully replaced on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub saved_at: DateTime<Utc>,
    pub records: Vec<EnrichedRecord>,
}

/// Whether `save_if_changed` actually wrote the snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    NotSaved,
}

pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: PathBuf) -> Self {
        SnapshotStore { path }
    }

    /// Loads the prior snapshot. A missing or unreadable file is a first
    /// run, never a failure.
    pub fn load(&self) -> Option<Snapshot> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!("No snapshot at {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!(
                    "Ignoring unparseable snapshot at {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    /// Replaces the snapshot with `records`, but only when the BTC value or
    /// aggregate percent change moved since `prior_totals`. Skipping the
    /// no-op write keeps the file stable when market data is static
    /// between runs.
    pub fn save_if_changed(
        &self,
        records: &[EnrichedRecord],
        totals: &AggregateMetrics,
        prior_totals: Option<&AggregateMetrics>,
    ) -> Result<SaveOutcome> {
        if let Some(prior) = prior_totals
            && prior.total_value_btc == totals.total_value_btc
            && prior.total_percent_change == totals.total_percent_change
        {
            debug!("Totals unchanged, skipping snapshot write");
            return Ok(SaveOutcome::NotSaved);
        }

        let snapshot = Snapshot {
            saved_at: Utc::now(),
            records: records.to_vec(),
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write snapshot to {}", self.path.display()))?;
        debug!("Snapshot written to {}", self.path.display());

        Ok(SaveOutcome::Saved)
    }

    /// Convenience over `load` for callers that only need prior totals.
    pub fn prior_totals(snapshot: Option<&Snapshot>) -> Option<AggregateMetrics> {
        snapshot.map(|s| aggregate(&s.records))
    }
}
