//! Single-stop selection tests on the synthetic Nancy grid.

mod fixtures;

use bike_rebalancer::classify::{BalanceStatus, ClassifiedStation};
use bike_rebalancer::error::{NoCandidateReason, PlanError};
use bike_rebalancer::graph::SearchBudget;
use bike_rebalancer::route::Action;
use bike_rebalancer::selector::{SelectOptions, Vehicle, select_station};

use fixtures::*;

// ============================================================================
// Candidate choice
// ============================================================================

#[test]
fn test_collect_and_deposit_pick_matching_stations() {
    let grid = Grid::new(5, 5);
    let stations = classified(&[station_at(1, (0, 1), 18, 20), station_at(2, (4, 4), 2, 20)]);
    assert_eq!(stations[0].status, BalanceStatus::Overstocked);
    assert_eq!(stations[1].status, BalanceStatus::Understocked);

    let driver = coords(0, 0);
    let collect = select_station(&grid.graph, driver, &stations, Action::Collect, &SelectOptions::default()).unwrap();
    assert_eq!(collect.station_id, 1);
    assert_eq!(collect.action, Action::Collect);

    let deposit = select_station(&grid.graph, driver, &stations, Action::Deposit, &SelectOptions::default()).unwrap();
    assert_eq!(deposit.station_id, 2);
    assert_eq!(deposit.distance_m, grid_distance((0, 0), (4, 4)));
}

#[test]
fn test_score_trades_bikes_against_distance() {
    let grid = Grid::new(5, 5);
    // 17 / 101 beats 20 / 401
    let stations = classified(&[station_at(1, (0, 4), 20, 20), station_at(2, (0, 1), 17, 20)]);
    let picked = select_station(&grid.graph, coords(0, 0), &stations, Action::Collect, &SelectOptions::default()).unwrap();
    assert_eq!(picked.station_id, 2);

    // 20 / 101 beats 17 / 401
    let stations = classified(&[station_at(1, (0, 1), 20, 20), station_at(2, (0, 4), 17, 20)]);
    let picked = select_station(&grid.graph, coords(0, 0), &stations, Action::Collect, &SelectOptions::default()).unwrap();
    assert_eq!(picked.station_id, 1);
}

#[test]
fn test_deposit_scores_free_stands() {
    let grid = Grid::new(3, 3);
    // Same distance, station 2 has more room.
    let stations = classified(&[station_at(1, (0, 1), 1, 10), station_at(2, (1, 0), 1, 30)]);
    let picked = select_station(&grid.graph, coords(0, 0), &stations, Action::Deposit, &SelectOptions::default()).unwrap();
    assert_eq!(picked.station_id, 2);
    assert_eq!(picked.bikes, 29);
}

#[test]
fn test_ties_go_to_first_station_in_input_order() {
    let grid = Grid::new(5, 5);
    let left = station_at(7, (2, 1), 18, 20);
    let right = station_at(3, (2, 3), 18, 20);

    let forward = classified(&[left.clone(), right.clone()]);
    let picked = select_station(&grid.graph, coords(2, 2), &forward, Action::Collect, &SelectOptions::default()).unwrap();
    assert_eq!(picked.station_id, 7);

    let backward = classified(&[right, left]);
    let picked = select_station(&grid.graph, coords(2, 2), &backward, Action::Collect, &SelectOptions::default()).unwrap();
    assert_eq!(picked.station_id, 3);
}

#[test]
fn test_repeated_calls_are_identical() {
    let grid = Grid::new(6, 6);
    let stations = classified(&[
        station_at(1, (5, 5), 19, 20),
        station_at(2, (1, 3), 17, 20),
        station_at(3, (3, 1), 18, 20),
        station_at(4, (0, 5), 1, 20),
    ]);
    let first = select_station(&grid.graph, coords(2, 2), &stations, Action::Collect, &SelectOptions::default()).unwrap();
    for _ in 0..5 {
        let again = select_station(&grid.graph, coords(2, 2), &stations, Action::Collect, &SelectOptions::default()).unwrap();
        assert_eq!(again, first);
    }
}

// ============================================================================
// No candidate
// ============================================================================

#[test]
fn test_collect_without_overstocked_station_is_no_candidate() {
    let grid = Grid::new(3, 3);
    let stations = classified(&[station_at(1, (0, 1), 10, 20), station_at(2, (2, 2), 1, 20)]);
    let err = select_station(&grid.graph, coords(0, 0), &stations, Action::Collect, &SelectOptions::default()).unwrap_err();
    assert_eq!(
        err,
        PlanError::NoCandidate {
            action: Action::Collect,
            reason: NoCandidateReason::NoneEligible
        }
    );
}

#[test]
fn test_unreachable_candidates_are_dropped() {
    let grid = Grid::new(3, 3).with_island();
    // The island station would win on bikes, but there is no road to it.
    let stations = classified(&[station_on_island(1, 40, 40), station_at(2, (2, 2), 17, 20)]);
    let picked = select_station(&grid.graph, coords(0, 0), &stations, Action::Collect, &SelectOptions::default()).unwrap();
    assert_eq!(picked.station_id, 2);
}

#[test]
fn test_all_unreachable_is_no_candidate() {
    let grid = Grid::new(3, 3).with_island();
    let stations = classified(&[station_on_island(1, 1, 20), station_at(2, (2, 2), 10, 20)]);
    let err = select_station(&grid.graph, coords(0, 0), &stations, Action::Deposit, &SelectOptions::default()).unwrap_err();
    assert_eq!(
        err,
        PlanError::NoCandidate {
            action: Action::Deposit,
            reason: NoCandidateReason::AllUnreachable
        }
    );
}

#[test]
fn test_exhausted_budget_counts_as_unreachable() {
    let grid = Grid::new(6, 6);
    let stations = classified(&[station_at(1, (5, 5), 18, 20)]);
    let options = SelectOptions {
        budget: SearchBudget::settled_nodes(3),
        ..Default::default()
    };
    let err = select_station(&grid.graph, coords(0, 0), &stations, Action::Collect, &options).unwrap_err();
    assert!(matches!(
        err,
        PlanError::NoCandidate {
            reason: NoCandidateReason::AllUnreachable,
            ..
        }
    ));
}

#[test]
fn test_unknown_action_is_rejected_before_routing() {
    let err = "rebalance".parse::<Action>().unwrap_err();
    assert_eq!(err, PlanError::InvalidAction("rebalance".to_string()));
}

// ============================================================================
// Bike counts and route
// ============================================================================

#[test]
fn test_vehicle_limits_bike_count() {
    let grid = Grid::new(3, 3);
    let stations = classified(&[station_at(1, (0, 1), 18, 20), station_at(2, (2, 2), 2, 20)]);
    let options = SelectOptions {
        vehicle: Some(Vehicle::new(10, 4).unwrap()),
        ..Default::default()
    };

    let collect = select_station(&grid.graph, coords(0, 0), &stations, Action::Collect, &options).unwrap();
    assert_eq!(collect.bikes, 6);

    let deposit = select_station(&grid.graph, coords(0, 0), &stations, Action::Deposit, &options).unwrap();
    assert_eq!(deposit.bikes, 4);
}

#[test]
fn test_without_vehicle_bikes_is_raw_station_count() {
    let grid = Grid::new(3, 3);
    let stations = classified(&[station_at(1, (0, 1), 18, 20), station_at(2, (2, 2), 2, 20)]);

    let collect = select_station(&grid.graph, coords(0, 0), &stations, Action::Collect, &SelectOptions::default()).unwrap();
    assert_eq!(collect.bikes, 18);

    let deposit = select_station(&grid.graph, coords(0, 0), &stations, Action::Deposit, &SelectOptions::default()).unwrap();
    assert_eq!(deposit.bikes, 18);
}

#[test]
fn test_vehicle_cannot_carry_more_than_capacity() {
    assert_eq!(
        Vehicle::new(5, 6),
        Err(PlanError::InvalidVehicle { capacity: 5, load: 6 })
    );
    assert_eq!(Vehicle::new(5, 5).unwrap().free_space(), 0);
}

#[test]
fn test_route_runs_from_driver_to_station() {
    let grid = Grid::new(4, 4);
    let stations = classified(&[station_at(9, (3, 2), 19, 20)]);
    let picked = select_station(&grid.graph, coords(0, 0), &stations, Action::Collect, &SelectOptions::default()).unwrap();

    let path = picked.path.nodes();
    assert_eq!(path.first(), Some(&node_id(0, 0)));
    assert_eq!(path.last(), Some(&node_id(3, 2)));
    assert_eq!(path.len(), 6);

    let summed: f64 = path
        .windows(2)
        .map(|pair| grid.graph.edge_length(pair[0], pair[1]).unwrap())
        .sum();
    assert_eq!(summed, picked.distance_m);
    assert_eq!(picked.distance_m, 500.0);
    assert_eq!(picked.from_coords, coords(0, 0));
    assert_eq!(picked.to_coords, coords(3, 2));
    assert_eq!(picked.station_name, "STATION 9");
}

#[test]
fn test_stored_candidate_with_more_bikes_than_stands_never_loads() {
    let json = r#"{
        "station": {
            "id": 5,
            "name": "BROKEN",
            "latitude": 48.68,
            "longitude": 6.17,
            "available_bikes": 1,
            "bike_stands": 0
        },
        "status": "understocked"
    }"#;
    assert!(serde_json::from_str::<ClassifiedStation>(json).is_err());

    // Stations that do load always report non-negative free stands.
    let fine = json.replace("\"bike_stands\": 0", "\"bike_stands\": 10");
    let candidate: ClassifiedStation = serde_json::from_str(&fine).unwrap();
    let grid = Grid::new(2, 2);
    let picked = select_station(
        &grid.graph,
        coords(0, 0),
        &[candidate],
        Action::Deposit,
        &SelectOptions::default(),
    )
    .unwrap();
    assert_eq!(picked.bikes, 9);
}
