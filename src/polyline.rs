//! Route geometry handed to the presentation layer.
//!
//! Points are decoded (lat, lng) pairs. Any wire encoding happens in the
//! renderer, not here.

use serde::{Deserialize, Serialize};

use crate::graph::RoadGraph;
use crate::route::{Action, RebalancingAction};
use crate::station::StationId;
use crate::traits::RouteSink;

/// A route geometry as decoded coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
}

impl Polyline {
    /// Each point is a (latitude, longitude) tuple.
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    /// Get the decoded points.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Consume and return the points.
    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }
}

/// A rendered leg: which station it leads to and its geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub station_id: StationId,
    pub action: Action,
    pub distance_m: f64,
    pub geometry: Polyline,
}

/// [`RouteSink`] that keeps every received route as geometry, in order.
#[derive(Debug, Clone, Default)]
pub struct PolylineCollector {
    legs: Vec<RouteLeg>,
}

impl PolylineCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Legs received so far, in order.
    pub fn legs(&self) -> &[RouteLeg] {
        &self.legs
    }

    /// Consume and return the legs.
    pub fn into_legs(self) -> Vec<RouteLeg> {
        self.legs
    }
}

impl RouteSink for PolylineCollector {
    fn render(&mut self, action: &RebalancingAction, graph: &RoadGraph) {
        self.legs.push(RouteLeg {
            station_id: action.station_id,
            action: action.action,
            distance_m: action.distance_m,
            geometry: action.path.polyline(graph),
        });
    }
}
