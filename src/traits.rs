//! Seams to the collaborators around the route core.
//!
//! The core never talks to a network or a renderer directly. Concrete
//! telemetry feeds, graph loaders and map widgets implement these.

use crate::error::{FetchError, GraphLoadError};
use crate::graph::RoadGraph;
use crate::route::RebalancingAction;
use crate::station::StationRecord;

/// Live station telemetry.
pub trait StationSource {
    /// Fetch the current station list. Retries, if any, belong to the implementor.
    fn fetch_stations(&self) -> Result<Vec<StationRecord>, FetchError>;
}

/// Kind of road network to load, mirroring OSM network types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkMode {
    Drive,
    Bike,
    Walk,
}

impl NetworkMode {
    /// Name used in graph file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkMode::Drive => "drive",
            NetworkMode::Bike => "bike",
            NetworkMode::Walk => "walk",
        }
    }
}

/// Provides a geocoded road network for a place.
pub trait GraphSource {
    fn load_road_graph(&self, place: &str, mode: NetworkMode) -> Result<RoadGraph, GraphLoadError>;
}

/// Receives decisions for display. Nothing it does feeds back into planning.
pub trait RouteSink {
    fn render(&mut self, action: &RebalancingAction, graph: &RoadGraph);
}
