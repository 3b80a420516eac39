//! A rectangular street grid anchored in central Nancy.
//!
//! Neighbouring intersections are ~100 m apart and every street is two-way
//! with a length of exactly 100 m, so road distances are Manhattan distances
//! times 100. Stations placed on an intersection snap to it.

#![allow(dead_code)]

use bike_rebalancer::classify::{ClassifiedStation, Thresholds, classify_stations};
use bike_rebalancer::graph::{NodeId, RoadGraph};
use bike_rebalancer::station::{Station, StationId};

pub const ORIGIN_LAT: f64 = 48.6800;
pub const ORIGIN_LNG: f64 = 6.1700;
pub const LAT_STEP: f64 = 0.0009;
pub const LNG_STEP: f64 = 0.00136;
pub const BLOCK_M: f64 = 100.0;

/// Somewhere in the Meurthe, far from every street.
pub const ISLAND: (f64, f64) = (48.7500, 6.2500);
pub const ISLAND_NODE: NodeId = 999_999;

pub struct Grid {
    pub graph: RoadGraph,
    pub rows: usize,
    pub cols: usize,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut graph = RoadGraph::new();
        for row in 0..rows {
            for col in 0..cols {
                graph.add_node(node_id(row, col), coords(row, col));
            }
        }
        for row in 0..rows {
            for col in 0..cols {
                if col + 1 < cols {
                    graph
                        .add_two_way(node_id(row, col), node_id(row, col + 1), BLOCK_M)
                        .unwrap();
                }
                if row + 1 < rows {
                    graph
                        .add_two_way(node_id(row, col), node_id(row + 1, col), BLOCK_M)
                        .unwrap();
                }
            }
        }
        Self { graph, rows, cols }
    }

    /// Adds an intersection with no streets at [`ISLAND`].
    pub fn with_island(mut self) -> Self {
        self.graph.add_node(ISLAND_NODE, ISLAND);
        self
    }
}

pub fn node_id(row: usize, col: usize) -> NodeId {
    (row * 1000 + col + 1) as NodeId
}

pub fn coords(row: usize, col: usize) -> (f64, f64) {
    (
        ORIGIN_LAT + row as f64 * LAT_STEP,
        ORIGIN_LNG + col as f64 * LNG_STEP,
    )
}

/// Road distance between two intersections on a full grid.
pub fn grid_distance(a: (usize, usize), b: (usize, usize)) -> f64 {
    (a.0.abs_diff(b.0) + a.1.abs_diff(b.1)) as f64 * BLOCK_M
}

pub fn station_at(id: StationId, at: (usize, usize), bikes: u32, stands: u32) -> Station {
    Station::new(id, format!("STATION {}", id), coords(at.0, at.1), bikes, stands).unwrap()
}

pub fn station_on_island(id: StationId, bikes: u32, stands: u32) -> Station {
    Station::new(id, format!("ISLAND {}", id), ISLAND, bikes, stands).unwrap()
}

pub fn classified(stations: &[Station]) -> Vec<ClassifiedStation> {
    classify_stations(stations, &Thresholds::default())
}
