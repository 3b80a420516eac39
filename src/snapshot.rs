//! Flat JSON store for per-station analysis, for display and debugging.
//!
//! Planning never reads this back; it only mirrors what the quantifier computed.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SnapshotError;
use crate::imbalance::{NetworkSummary, QuantifierConfig, StationAnalysis, analyse_stations};
use crate::station::Station;

/// Per-station analysis together with the config that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub config: QuantifierConfig,
    pub stations: Vec<StationAnalysis>,
}

impl AnalysisSnapshot {
    /// Analyse `stations` under `config`.
    pub fn capture(stations: &[Station], config: QuantifierConfig) -> Self {
        Self {
            stations: analyse_stations(stations, &config),
            config,
        }
    }

    /// Network totals for this snapshot.
    pub fn summary(&self) -> NetworkSummary {
        NetworkSummary::from_analysis(&self.stations)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the snapshot, replacing any previous file atomically.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let tmp_path = path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        drop(writer);
        fs::rename(&tmp_path, path)?;
        debug!(path = %path.display(), stations = self.stations.len(), "saved analysis snapshot");
        Ok(())
    }

    /// Read a snapshot written by [`AnalysisSnapshot::save`].
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
