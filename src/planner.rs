//! Multi-stop rebalancing tour.
//!
//! Greedy nearest-first: while the vehicle has room and overstocked stations
//! remain it drives to the closest one and collects; otherwise it drives to
//! the closest understocked station and drops. This is a heuristic, not an
//! optimal tour, and it makes no attempt to be one.
//!
//! Station counts change as the tour progresses. Those changes live in a
//! [`FleetSimulation`] that owns copies of the stations; the caller's input
//! is never touched.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classify::{BalanceStatus, ClassifiedStation, Thresholds};
use crate::error::PlanError;
use crate::graph::{RoadGraph, SearchBudget};
use crate::route::{Action, RebalancingAction, Route};
use crate::selector::eligible_status;
use crate::station::{Station, StationId};

/// Vehicle and search settings for a tour.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub capacity: u32,
    /// Bikes on board at the start of the tour.
    pub initial_load: u32,
    /// Decides when a visited station counts as fixed. Should match the pair
    /// the input was classified with.
    pub thresholds: Thresholds,
    pub budget: SearchBudget,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            capacity: 10,
            initial_load: 0,
            thresholds: Thresholds::default(),
            budget: SearchBudget::default(),
        }
    }
}

/// One visited station and the load after servicing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedStop {
    pub action: RebalancingAction,
    pub load_after: u32,
}

/// Why the tour left a station imbalanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// No road route from where the tour ended.
    Unreachable,
    /// Still overstocked but the vehicle is full.
    VehicleFull,
    /// Still understocked but the vehicle is empty.
    VehicleEmpty,
}

/// A station still imbalanced when the tour ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedStation {
    pub station_id: StationId,
    pub status: BalanceStatus,
    pub reason: SkipReason,
}

/// Result of [`plan_tour`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TourPlan {
    pub stops: Vec<PlannedStop>,
    /// Stations left imbalanced when the tour could make no more progress.
    pub skipped: Vec<SkippedStation>,
    pub final_load: u32,
}

impl TourPlan {
    /// Road distance over all stops, in metres.
    pub fn total_distance_m(&self) -> f64 {
        self.stops.iter().map(|stop| stop.action.distance_m).sum()
    }

    /// Bikes collected or deposited over the tour.
    pub fn bikes_moved(&self, action: Action) -> u32 {
        self.stops
            .iter()
            .filter(|stop| stop.action.action == action)
            .map(|stop| stop.action.bikes)
            .sum()
    }
}

/// Mutable state of a tour in progress.
#[derive(Debug, Clone)]
pub struct FleetSimulation {
    stations: Vec<Station>,
    /// Indices into `stations`, most bikes first.
    overstocked: Vec<usize>,
    /// Indices into `stations`, fewest bikes first.
    understocked: Vec<usize>,
    position: (f64, f64),
    load: u32,
    capacity: u32,
    thresholds: Thresholds,
}

impl FleetSimulation {
    /// Start a simulation from the classified snapshot. The input is copied, never mutated.
    pub fn new(
        stations: &[ClassifiedStation],
        start: (f64, f64),
        options: &PlanOptions,
    ) -> Result<Self, PlanError> {
        if options.initial_load > options.capacity {
            return Err(PlanError::InvalidVehicle {
                capacity: options.capacity,
                load: options.initial_load,
            });
        }

        let owned: Vec<Station> = stations.iter().map(|c| c.station.clone()).collect();
        let with_status = |status: BalanceStatus| -> Vec<usize> {
            stations
                .iter()
                .enumerate()
                .filter(|(_, c)| c.status == status)
                .map(|(idx, _)| idx)
                .collect()
        };

        let mut overstocked = with_status(BalanceStatus::Overstocked);
        overstocked.sort_by_key(|&idx| Reverse(owned[idx].available_bikes()));
        let mut understocked = with_status(BalanceStatus::Understocked);
        understocked.sort_by_key(|&idx| owned[idx].available_bikes());

        Ok(Self {
            stations: owned,
            overstocked,
            understocked,
            position: start,
            load: options.initial_load,
            capacity: options.capacity,
            thresholds: options.thresholds,
        })
    }

    /// Bikes currently on board.
    pub fn load(&self) -> u32 {
        self.load
    }

    /// Current vehicle location as (lat, lng).
    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    /// Check if no imbalanced station remains.
    pub fn is_settled(&self) -> bool {
        self.overstocked.is_empty() && self.understocked.is_empty()
    }

    /// Simulated state of a station.
    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.iter().find(|s| s.id() == id)
    }

    /// Nearest reachable station in the remaining set for `action`, as a
    /// position in that set plus its route.
    fn nearest(&self, graph: &RoadGraph, action: Action, budget: &SearchBudget) -> Option<(usize, Route)> {
        let remaining = self.remaining(action);
        let targets: Vec<(f64, f64)> = remaining
            .iter()
            .map(|&idx| self.stations[idx].coords())
            .collect();

        let mut best: Option<(usize, Route)> = None;
        for (slot, result) in graph
            .routes_from(self.position, &targets, budget)
            .into_iter()
            .enumerate()
        {
            let route = match result {
                Ok(route) => route,
                Err(err) => {
                    debug!(station = self.stations[remaining[slot]].id(), %err, "skipping unreachable station");
                    continue;
                }
            };
            match &best {
                Some((_, best_route)) if route.distance_m() >= best_route.distance_m() => {}
                _ => best = Some((slot, route)),
            }
        }
        best
    }

    /// Drives to the nearest station for `action` and services it.
    /// Returns `None` when nothing in the remaining set is reachable.
    fn visit_nearest(
        &mut self,
        graph: &RoadGraph,
        action: Action,
        budget: &SearchBudget,
    ) -> Option<PlannedStop> {
        let (slot, path) = self.nearest(graph, action, budget)?;
        let idx = self.remaining(action)[slot];
        let low_watermark = self.thresholds.low_watermark(self.stations[idx].bike_stands());
        let station = &mut self.stations[idx];

        let bikes = match action {
            Action::Collect => {
                let bikes = station.take_bikes(self.capacity - self.load);
                self.load += bikes;
                bikes
            }
            Action::Deposit => {
                let deficit = low_watermark.saturating_sub(station.available_bikes());
                let bikes = station.dock_bikes(self.load.min(deficit));
                self.load -= bikes;
                bikes
            }
        };

        let still_needs_visit = self.thresholds.balance_status(station) == eligible_status(action);

        let stop = PlannedStop {
            action: RebalancingAction {
                action,
                station_id: station.id(),
                station_name: station.name().to_string(),
                from_coords: self.position,
                to_coords: station.coords(),
                distance_m: path.distance_m(),
                bikes,
                path,
            },
            load_after: self.load,
        };
        self.position = station.coords();

        if !still_needs_visit {
            self.remaining_mut(action).remove(slot);
        }

        debug!(
            %action,
            station = stop.action.station_id,
            bikes,
            load = self.load,
            distance_m = stop.action.distance_m,
            "planned stop"
        );
        Some(stop)
    }

    fn remaining(&self, action: Action) -> &[usize] {
        match action {
            Action::Collect => &self.overstocked,
            Action::Deposit => &self.understocked,
        }
    }

    fn remaining_mut(&mut self, action: Action) -> &mut Vec<usize> {
        match action {
            Action::Collect => &mut self.overstocked,
            Action::Deposit => &mut self.understocked,
        }
    }

    /// Stations still imbalanced, with why the tour could not reach them.
    fn skipped(&self) -> Vec<SkippedStation> {
        let over = self.overstocked.iter().map(|&idx| SkippedStation {
            station_id: self.stations[idx].id(),
            status: BalanceStatus::Overstocked,
            reason: if self.load < self.capacity {
                SkipReason::Unreachable
            } else {
                SkipReason::VehicleFull
            },
        });
        let under = self.understocked.iter().map(|&idx| SkippedStation {
            station_id: self.stations[idx].id(),
            status: BalanceStatus::Understocked,
            reason: if self.load > 0 {
                SkipReason::Unreachable
            } else {
                SkipReason::VehicleEmpty
            },
        });
        over.chain(under).collect()
    }
}

/// Plans a full collect/drop tour from `start` until no imbalanced station
/// is left or none of the remaining ones can be served.
///
/// Every stop either moves bikes or retires a station, and bikes only move
/// out of the initially overstocked set, so the tour always ends. Candidates
/// that cannot be reached from the current position stay in play and are
/// tried again from later positions.
pub fn plan_tour(
    graph: &RoadGraph,
    stations: &[ClassifiedStation],
    start: (f64, f64),
    options: &PlanOptions,
) -> Result<TourPlan, PlanError> {
    let mut sim = FleetSimulation::new(stations, start, options)?;
    let mut stops = Vec::new();

    while !sim.is_settled() {
        let mut stop = None;
        if sim.load < sim.capacity && !sim.overstocked.is_empty() {
            stop = sim.visit_nearest(graph, Action::Collect, &options.budget);
        }
        if stop.is_none() && sim.load > 0 && !sim.understocked.is_empty() {
            stop = sim.visit_nearest(graph, Action::Deposit, &options.budget);
        }

        match stop {
            Some(stop) => stops.push(stop),
            None => break,
        }
    }

    let skipped = sim.skipped();
    if !skipped.is_empty() {
        warn!(
            skipped = skipped.len(),
            load = sim.load,
            "tour ended with stations left imbalanced"
        );
    }

    let plan = TourPlan {
        stops,
        skipped,
        final_load: sim.load,
    };
    info!(
        stops = plan.stops.len(),
        distance_m = plan.total_distance_m(),
        final_load = plan.final_load,
        "planned rebalancing tour"
    );
    Ok(plan)
}
