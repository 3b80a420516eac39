//! Routes and the rebalancing decisions built on them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::graph::{NodeId, RoadGraph};
use crate::polyline::Polyline;
use crate::station::StationId;

/// Ordered node ids from origin to destination, with the total edge length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    nodes: Vec<NodeId>,
    distance_m: f64,
}

impl Route {
    /// Create a route from its node sequence and total length.
    pub fn new(nodes: Vec<NodeId>, distance_m: f64) -> Self {
        Self { nodes, distance_m }
    }

    /// Node ids from origin to destination.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Consume and return the node ids.
    pub fn into_nodes(self) -> Vec<NodeId> {
        self.nodes
    }

    /// Sum of the traversed edge lengths in metres.
    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    /// First node, if any.
    pub fn origin(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// Last node, if any.
    pub fn destination(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Route geometry as (lat, lng) points. Ids missing from `graph` are skipped.
    pub fn polyline(&self, graph: &RoadGraph) -> Polyline {
        Polyline::new(
            self.nodes
                .iter()
                .filter_map(|id| graph.node(*id))
                .map(|node| node.coords())
                .collect(),
        )
    }
}

/// What the vehicle does at the chosen station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Pick up surplus bikes at an overstocked station.
    Collect,
    /// Drop bikes at an understocked station.
    Deposit,
}

impl Action {
    /// Wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Collect => "collect",
            Action::Deposit => "deposit",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collect" => Ok(Action::Collect),
            "deposit" => Ok(Action::Deposit),
            other => Err(PlanError::InvalidAction(other.to_string())),
        }
    }
}

/// One decision: where to go, what to do there, and how to get there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalancingAction {
    pub action: Action,
    pub station_id: StationId,
    pub station_name: String,
    pub from_coords: (f64, f64),
    pub to_coords: (f64, f64),
    pub distance_m: f64,
    pub bikes: u32,
    pub path: Route,
}
