//! Station records from the telemetry feed and their validated form.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StationError;

/// Station number as issued by the operator.
pub type StationId = u32;

/// Raw station record as delivered by the feed.
///
/// Field names follow the JCDecaux VLS v1 payload. Only the fields the core
/// consumes are kept; everything else in the payload is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    #[serde(alias = "id")]
    pub number: StationId,
    pub name: String,
    pub position: Position,
    pub available_bikes: u32,
    #[serde(default)]
    pub available_bike_stands: Option<u32>,
    #[serde(default)]
    pub bike_stands: Option<u32>,
}

/// Feed coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

/// A validated station. `available_bikes <= bike_stands` always holds.
///
/// Fields are read through accessors; deserialization goes through
/// [`Station::new`] so a stored station is checked like a fresh one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StationFields")]
pub struct Station {
    id: StationId,
    name: String,
    latitude: f64,
    longitude: f64,
    available_bikes: u32,
    bike_stands: u32,
}

/// Unchecked wire shape of [`Station`].
#[derive(Deserialize)]
struct StationFields {
    id: StationId,
    name: String,
    latitude: f64,
    longitude: f64,
    available_bikes: u32,
    bike_stands: u32,
}

impl TryFrom<StationFields> for Station {
    type Error = StationError;

    fn try_from(fields: StationFields) -> Result<Self, Self::Error> {
        Station::new(
            fields.id,
            fields.name,
            (fields.latitude, fields.longitude),
            fields.available_bikes,
            fields.bike_stands,
        )
    }
}

impl Station {
    /// Builds a station, rejecting counts that would leave negative free stands.
    pub fn new(
        id: StationId,
        name: impl Into<String>,
        (latitude, longitude): (f64, f64),
        available_bikes: u32,
        bike_stands: u32,
    ) -> Result<Self, StationError> {
        if !latitude.is_finite()
            || !longitude.is_finite()
            || latitude.abs() > 90.0
            || longitude.abs() > 180.0
        {
            return Err(StationError::InvalidCoordinates {
                id,
                lat: latitude,
                lng: longitude,
            });
        }
        if available_bikes > bike_stands {
            return Err(StationError::NegativeStands {
                id,
                available_bikes,
                bike_stands,
            });
        }

        Ok(Self {
            id,
            name: name.into(),
            latitude,
            longitude,
            available_bikes,
            bike_stands,
        })
    }

    /// Validates a feed record.
    ///
    /// Capacity comes from `bike_stands` when present, otherwise from
    /// `available_bikes + available_bike_stands`.
    pub fn from_record(record: &StationRecord) -> Result<Self, StationError> {
        let bike_stands = match (record.bike_stands, record.available_bike_stands) {
            (Some(total), _) => total,
            (None, Some(free)) => record.available_bikes.saturating_add(free),
            (None, None) => return Err(StationError::MissingCapacity { id: record.number }),
        };

        Self::new(
            record.number,
            display_name(&record.name),
            (record.position.lat, record.position.lng),
            record.available_bikes,
            bike_stands,
        )
    }

    /// Operator station number.
    pub fn id(&self) -> StationId {
        self.id
    }

    /// Display name, without the feed's code prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Bikes currently docked.
    pub fn available_bikes(&self) -> u32 {
        self.available_bikes
    }

    /// Total docks, occupied or free.
    pub fn bike_stands(&self) -> u32 {
        self.bike_stands
    }

    /// Free docks. Never negative.
    pub fn available_stands(&self) -> u32 {
        self.bike_stands.saturating_sub(self.available_bikes)
    }

    /// Removes up to `bikes` bikes and returns how many were taken.
    pub(crate) fn take_bikes(&mut self, bikes: u32) -> u32 {
        let taken = bikes.min(self.available_bikes);
        self.available_bikes -= taken;
        taken
    }

    /// Docks up to `bikes` bikes and returns how many fit.
    pub(crate) fn dock_bikes(&mut self, bikes: u32) -> u32 {
        let docked = bikes.min(self.available_stands());
        self.available_bikes += docked;
        docked
    }

    /// Location as (lat, lng).
    pub fn coords(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Strips the `"<code> - "` prefix the feed puts in front of station names.
pub fn display_name(raw: &str) -> &str {
    match raw.split_once(" - ") {
        Some((_, rest)) => rest.trim(),
        None => raw.trim(),
    }
}

/// A record kept out of planning, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    pub id: StationId,
    pub error: StationError,
}

/// Outcome of validating a batch of feed records.
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    /// Accepted stations, in feed order.
    pub stations: Vec<Station>,
    pub rejected: Vec<RejectedRecord>,
}

/// Validates feed records at the ingestion boundary.
///
/// Records whose number is in `excluded` are dropped silently. Malformed
/// records are reported in [`Ingested::rejected`] and never reach
/// classification.
pub fn ingest(records: &[StationRecord], excluded: &[StationId]) -> Ingested {
    let mut ingested = Ingested::default();

    for record in records {
        if excluded.contains(&record.number) {
            continue;
        }
        match Station::from_record(record) {
            Ok(station) => ingested.stations.push(station),
            Err(error) => {
                warn!(station = record.number, %error, "rejecting station record");
                ingested.rejected.push(RejectedRecord {
                    id: record.number,
                    error,
                });
            }
        }
    }

    ingested
}
