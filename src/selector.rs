//! Single-stop selection: the best station to visit next for one action.
//!
//! Candidates are scored by the bikes (collect) or free stands (deposit) they
//! offer per metre of road, `count / (distance + 1)`. The `+ 1` keeps a
//! station under the driver's feet from dividing by zero.

use tracing::{debug, info};

use crate::classify::{BalanceStatus, ClassifiedStation};
use crate::error::{NoCandidateReason, PlanError};
use crate::graph::{RoadGraph, SearchBudget};
use crate::route::{Action, RebalancingAction, Route};
use crate::station::Station;

/// Vehicle capacity and the bikes currently on board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vehicle {
    capacity: u32,
    load: u32,
}

impl Vehicle {
    /// Create a vehicle. Fails when `load` exceeds `capacity`.
    pub fn new(capacity: u32, load: u32) -> Result<Self, PlanError> {
        if load > capacity {
            return Err(PlanError::InvalidVehicle { capacity, load });
        }
        Ok(Self { capacity, load })
    }

    /// Maximum bikes on board.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Bikes currently on board.
    pub fn load(&self) -> u32 {
        self.load
    }

    /// Room left for collecting.
    pub fn free_space(&self) -> u32 {
        self.capacity - self.load
    }
}

/// Settings for [`select_station`].
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    /// When `None`, the reported bike count is the station's raw count.
    pub vehicle: Option<Vehicle>,
    pub budget: SearchBudget,
}

/// Status a station must carry to be a candidate for `action`.
pub fn eligible_status(action: Action) -> BalanceStatus {
    match action {
        Action::Collect => BalanceStatus::Overstocked,
        Action::Deposit => BalanceStatus::Understocked,
    }
}

/// Bikes on offer (collect) or room on offer (deposit) at a station.
pub fn offered(station: &Station, action: Action) -> u32 {
    match action {
        Action::Collect => station.available_bikes(),
        Action::Deposit => station.available_stands(),
    }
}

/// Candidate score, `offered / (distance_m + 1)`.
pub fn score(station: &Station, action: Action, distance_m: f64) -> f64 {
    f64::from(offered(station, action)) / (distance_m + 1.0)
}

/// Picks the highest-scoring reachable station for `action` and routes to it.
///
/// Unreachable candidates are dropped, not penalised. Equal scores go to the
/// station that comes first in `stations`.
pub fn select_station(
    graph: &RoadGraph,
    driver: (f64, f64),
    stations: &[ClassifiedStation],
    action: Action,
    options: &SelectOptions,
) -> Result<RebalancingAction, PlanError> {
    let wanted = eligible_status(action);
    let candidates: Vec<&Station> = stations
        .iter()
        .filter(|c| c.status == wanted)
        .map(|c| &c.station)
        .collect();

    debug!(%action, candidates = candidates.len(), "filtered stations");
    if candidates.is_empty() {
        return Err(PlanError::NoCandidate {
            action,
            reason: NoCandidateReason::NoneEligible,
        });
    }

    let targets: Vec<(f64, f64)> = candidates.iter().map(|s| s.coords()).collect();
    let routes = graph.routes_from(driver, &targets, &options.budget);

    let mut best: Option<(f64, &Station, Route)> = None;
    for (station, result) in candidates.into_iter().zip(routes) {
        let route = match result {
            Ok(route) => route,
            Err(err) => {
                debug!(station = station.id(), %err, "candidate unreachable");
                continue;
            }
        };
        let candidate_score = score(station, action, route.distance_m());
        match &best {
            Some((best_score, _, _)) if candidate_score <= *best_score => {}
            _ => best = Some((candidate_score, station, route)),
        }
    }

    let Some((best_score, station, path)) = best else {
        return Err(PlanError::NoCandidate {
            action,
            reason: NoCandidateReason::AllUnreachable,
        });
    };

    let bikes = match options.vehicle {
        Some(vehicle) => match action {
            Action::Collect => vehicle.free_space().min(station.available_bikes()),
            Action::Deposit => vehicle.load().min(station.available_stands()),
        },
        None => offered(station, action),
    };

    info!(
        %action,
        station = station.id(),
        distance_m = path.distance_m(),
        score = best_score,
        bikes,
        "selected station"
    );

    Ok(RebalancingAction {
        action,
        station_id: station.id(),
        station_name: station.name().to_string(),
        from_coords: driver,
        to_coords: station.coords(),
        distance_m: path.distance_m(),
        bikes,
        path,
    })
}
