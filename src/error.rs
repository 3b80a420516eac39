//! Error taxonomy for the rebalancing core.
//!
//! Per-candidate failures (`GraphError::NoPath`, `GraphError::BudgetExhausted`)
//! are absorbed by the selector and planner. Only whole-call failures reach
//! the caller, always as one of these typed values.

use std::fmt;

use thiserror::Error;

use crate::graph::NodeId;
use crate::route::Action;
use crate::station::StationId;

/// Failure fetching live station telemetry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("feed returned HTTP status {0}")]
    Http(u16),

    #[error("could not connect to station feed: {0}")]
    Connection(String),

    #[error("station feed did not answer in time")]
    Timeout,

    #[error("no API key configured (set JCDECAUX_API_KEY)")]
    MissingApiKey,

    #[error("station feed error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for FetchError {
    /// The request URL is dropped first; it carries the API key.
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Http(status.as_u16())
        } else {
            FetchError::Other(err.to_string())
        }
    }
}

/// Failure answering a query against a [`crate::graph::RoadGraph`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("road graph has no nodes")]
    EmptyGraph,

    #[error("node {0} is not in the road graph")]
    UnknownNode(NodeId),

    #[error("no path from node {from} to node {to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error("search budget exhausted after settling {settled} nodes")]
    BudgetExhausted { settled: usize },

    #[error("edge {from} -> {to} has invalid length {length}")]
    InvalidEdgeLength { from: NodeId, to: NodeId, length: f64 },
}

/// Failure loading a road graph from its source.
#[derive(Debug, Error)]
pub enum GraphLoadError {
    #[error("graph file I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("graph file is malformed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// A station record that breaks a data invariant and was kept out of planning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StationError {
    #[error("station {id}: {available_bikes} bikes exceed {bike_stands} stands")]
    NegativeStands {
        id: StationId,
        available_bikes: u32,
        bike_stands: u32,
    },

    #[error("station {id}: neither bike_stands nor available_bike_stands present")]
    MissingCapacity { id: StationId },

    #[error("station {id}: coordinates ({lat}, {lng}) are not usable")]
    InvalidCoordinates { id: StationId, lat: f64, lng: f64 },
}

/// Fill-ratio thresholds outside `0 <= low < high <= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid thresholds low={low} high={high}, expected 0 <= low < high <= 1")]
pub struct InvalidThresholds {
    pub low: f64,
    pub high: f64,
}

/// Why a selection found nothing to visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoCandidateReason {
    /// No station carries the status the action needs.
    NoneEligible,
    /// Eligible stations exist but none can be reached by road.
    AllUnreachable,
}

impl fmt::Display for NoCandidateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoCandidateReason::NoneEligible => write!(f, "no eligible station"),
            NoCandidateReason::AllUnreachable => write!(f, "every eligible station is unreachable"),
        }
    }
}

/// Failure of a planning call as a whole.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("no suitable station to {action}: {reason}")]
    NoCandidate {
        action: Action,
        reason: NoCandidateReason,
    },

    #[error("unknown action {0:?}, expected \"collect\" or \"deposit\"")]
    InvalidAction(String),

    #[error("vehicle load {load} exceeds capacity {capacity}")]
    InvalidVehicle { capacity: u32, load: u32 },
}

/// Failure reading or writing an analysis snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}
