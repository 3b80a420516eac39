//! Three-state balance classification against a (low, high) ratio pair.
//!
//! This is the granularity the selector and planner work with. The finer
//! five-state scheme in [`crate::imbalance`] is for reporting only.

use serde::{Deserialize, Serialize};

use crate::error::InvalidThresholds;
use crate::station::Station;

/// Three-state balance of a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceStatus {
    Overstocked,
    Understocked,
    Balanced,
}

/// Fill-ratio thresholds, `0 <= low < high <= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ThresholdFields")]
pub struct Thresholds {
    low: f64,
    high: f64,
}

#[derive(Deserialize)]
struct ThresholdFields {
    low: f64,
    high: f64,
}

impl TryFrom<ThresholdFields> for Thresholds {
    type Error = InvalidThresholds;

    fn try_from(fields: ThresholdFields) -> Result<Self, Self::Error> {
        Thresholds::new(fields.low, fields.high).ok_or(InvalidThresholds {
            low: fields.low,
            high: fields.high,
        })
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { low: 0.2, high: 0.8 }
    }
}

impl Thresholds {
    /// Returns `None` unless `0 <= low < high <= 1`.
    pub fn new(low: f64, high: f64) -> Option<Self> {
        (0.0 <= low && low < high && high <= 1.0).then_some(Self { low, high })
    }

    /// Ratio below which a station is understocked.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Ratio above which a station is overstocked.
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Status of `station` under these thresholds.
    pub fn balance_status(&self, station: &Station) -> BalanceStatus {
        balance_status(station.available_bikes(), station.bike_stands(), self)
    }

    /// Smallest bike count at which `bike_stands` is no longer understocked.
    pub fn low_watermark(&self, bike_stands: u32) -> u32 {
        (f64::from(bike_stands) * self.low).ceil() as u32
    }
}

/// Classifies raw counts. A station with no stands is always balanced.
pub fn balance_status(available_bikes: u32, bike_stands: u32, thresholds: &Thresholds) -> BalanceStatus {
    if bike_stands == 0 {
        return BalanceStatus::Balanced;
    }
    let bikes = f64::from(available_bikes);
    let stands = f64::from(bike_stands);
    if bikes > stands * thresholds.high {
        BalanceStatus::Overstocked
    } else if bikes < stands * thresholds.low {
        BalanceStatus::Understocked
    } else {
        BalanceStatus::Balanced
    }
}

/// A station paired with its status. Position in the input list is the
/// tie-break key for every "first match" rule downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedStation {
    pub station: Station,
    pub status: BalanceStatus,
}

/// Classifies each station independently, preserving input order.
pub fn classify_stations(stations: &[Station], thresholds: &Thresholds) -> Vec<ClassifiedStation> {
    stations
        .iter()
        .map(|station| ClassifiedStation {
            station: station.clone(),
            status: thresholds.balance_status(station),
        })
        .collect()
}
