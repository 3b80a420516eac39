//! Real Nancy landmarks and feed-shaped records built from them.
//!
//! Coordinates sourced from OpenStreetMap.

#![allow(dead_code)]

use bike_rebalancer::station::{Position, StationId, StationRecord};

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Place {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Place {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

pub const PLACES: &[Place] = &[
    Place::new("PLACE STANISLAS", 48.6936, 6.1832),
    Place::new("GARE", 48.6899, 6.1744),
    Place::new("PEPINIERE", 48.6967, 6.1848),
    Place::new("SAINT EPVRE", 48.6958, 6.1801),
    Place::new("ARTEM", 48.6820, 6.1660),
    Place::new("VANDOEUVRE", 48.6676, 6.1690),
];

/// Feed record for the `idx`-th place, named the way the feed names stations.
pub fn feed_record(idx: usize, number: StationId, bikes: u32, free_stands: u32) -> StationRecord {
    let place = &PLACES[idx];
    StationRecord {
        number,
        name: format!("{:05} - {}", number, place.name),
        position: Position {
            lat: place.lat,
            lng: place.lng,
        },
        available_bikes: bikes,
        available_bike_stands: Some(free_stands),
        bike_stands: Some(bikes + free_stands),
    }
}
