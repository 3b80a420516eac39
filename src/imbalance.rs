//! Five-state station status and corrective bike counts.
//!
//! Output is advisory: it feeds reports and map popups, it never moves bikes.
//! Rules are checked in a fixed order and the first match wins, so a station
//! with zero bikes is `Empty` whatever the percentage thresholds say.

use serde::{Deserialize, Serialize};

use crate::station::{Station, StationId};

/// Five-state fill level used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationStatus {
    Empty,
    AlmostEmpty,
    Balanced,
    AlmostFull,
    Full,
}

/// Percent thresholds and safety margin for the five-state analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantifierConfig {
    /// Fill percentage (0-100) below which a station is almost empty.
    pub almost_empty: f64,
    /// Fill percentage (0-100) above which a station is almost full.
    pub almost_full: f64,
    /// Smallest corrective move worth a trip.
    pub margin: u32,
}

impl Default for QuantifierConfig {
    fn default() -> Self {
        Self {
            almost_empty: 30.0,
            almost_full: 70.0,
            margin: 5,
        }
    }
}

/// Per-station analysis record, also the unit of the persisted snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationAnalysis {
    pub station_id: StationId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub available_bikes: u32,
    pub available_stands: u32,
    pub total_capacity: u32,
    pub status: StationStatus,
    pub bikes_to_add: u32,
    pub bikes_to_remove: u32,
}

/// Fill percentage, 0 for a station without capacity.
pub fn bike_percentage(available_bikes: u32, total_capacity: u32) -> f64 {
    if total_capacity == 0 {
        return 0.0;
    }
    f64::from(available_bikes) / f64::from(total_capacity) * 100.0
}

/// Status and corrective deltas for one station.
pub fn analyse_station(station: &Station, config: &QuantifierConfig) -> StationAnalysis {
    let bikes = station.available_bikes();
    let stands = station.available_stands();
    let capacity = station.bike_stands();
    let percentage = bike_percentage(bikes, capacity);
    let capacity_f = f64::from(capacity);

    let (status, bikes_to_add, bikes_to_remove) = if bikes == 0 {
        (StationStatus::Empty, stands.max(config.margin), 0)
    } else if percentage < config.almost_empty {
        let needed = ((config.almost_empty - percentage) / 100.0 * capacity_f).floor() as u32;
        (StationStatus::AlmostEmpty, needed.max(config.margin), 0)
    } else if percentage > config.almost_full {
        let needed = ((percentage - config.almost_full) / 100.0 * capacity_f).floor() as u32;
        (StationStatus::AlmostFull, 0, needed + config.margin)
    } else if stands == 0 {
        (StationStatus::Full, 0, bikes + config.margin)
    } else {
        (StationStatus::Balanced, 0, 0)
    };

    StationAnalysis {
        station_id: station.id(),
        name: station.name().to_string(),
        latitude: station.latitude(),
        longitude: station.longitude(),
        available_bikes: bikes,
        available_stands: stands,
        total_capacity: capacity,
        status,
        bikes_to_add,
        bikes_to_remove,
    }
}

/// Analyse every station, preserving input order.
pub fn analyse_stations(stations: &[Station], config: &QuantifierConfig) -> Vec<StationAnalysis> {
    stations
        .iter()
        .map(|station| analyse_station(station, config))
        .collect()
}

/// Network-wide totals over an analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub station_count: usize,
    pub total_bikes: u64,
    pub total_free_stands: u64,
    pub empty: usize,
    pub almost_empty: usize,
    pub balanced: usize,
    pub almost_full: usize,
    pub full: usize,
    pub bikes_to_add: u64,
    pub bikes_to_remove: u64,
}

impl NetworkSummary {
    /// Aggregate per-station results into network totals.
    pub fn from_analysis(analysis: &[StationAnalysis]) -> Self {
        let mut summary = NetworkSummary {
            station_count: analysis.len(),
            ..Default::default()
        };
        for record in analysis {
            summary.total_bikes += u64::from(record.available_bikes);
            summary.total_free_stands += u64::from(record.available_stands);
            summary.bikes_to_add += u64::from(record.bikes_to_add);
            summary.bikes_to_remove += u64::from(record.bikes_to_remove);
            match record.status {
                StationStatus::Empty => summary.empty += 1,
                StationStatus::AlmostEmpty => summary.almost_empty += 1,
                StationStatus::Balanced => summary.balanced += 1,
                StationStatus::AlmostFull => summary.almost_full += 1,
                StationStatus::Full => summary.full += 1,
            }
        }
        summary
    }
}
