//! bike-rebalancer core
//!
//! Decides which bike-share station a rebalancing vehicle should visit next
//! and routes it there over a weighted road graph.

pub mod traits;
pub mod error;
pub mod station;
pub mod haversine;
pub mod graph;
pub mod graph_store;
pub mod route;
pub mod polyline;
pub mod classify;
pub mod imbalance;
pub mod snapshot;
pub mod selector;
pub mod planner;
pub mod jcdecaux;
pub mod logging;
