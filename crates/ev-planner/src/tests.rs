//! Unit tests for ev-planner.

use ev_core::{GeoPoint, NodeKey};
use ev_spatial::{RoadNetwork, RoadNetworkBuilder};

// ── Helpers ───────────────────────────────────────────────────────────────────

const A: NodeKey = NodeKey(1);
const B: NodeKey = NodeKey(2);
const C: NodeKey = NodeKey(3);
const D: NodeKey = NodeKey(4);

/// A–B (10), B–C (10), C is a charging station, D is isolated.
fn abc_network() -> RoadNetwork {
    let mut b = RoadNetworkBuilder::new();
    let a = b.add_node(A, GeoPoint::new(28.60, 77.20));
    let bb = b.add_node(B, GeoPoint::new(28.55, 77.15));
    let c = b.add_charging_station(C, GeoPoint::new(28.50, 77.10));
    b.add_node(D, GeoPoint::new(28.40, 77.00));
    b.add_road(a, bb, 10.0);
    b.add_road(bb, c, 10.0);
    b.build().unwrap()
}

/// Six-node mesh with several competing paths and two stations.
///
/// ```text
///   1 ──4── 2 ──3── 3*
///   │       │       │
///   7       1       9
///   │       │       │
///   4 ──2── 5 ──6── 6*
/// ```
fn mesh_network() -> RoadNetwork {
    let mut b = RoadNetworkBuilder::new();
    let n1 = b.add_node(NodeKey(1), GeoPoint::new(0.0, 0.0));
    let n2 = b.add_node(NodeKey(2), GeoPoint::new(0.0, 1.0));
    let n3 = b.add_charging_station(NodeKey(3), GeoPoint::new(0.0, 2.0));
    let n4 = b.add_node(NodeKey(4), GeoPoint::new(1.0, 0.0));
    let n5 = b.add_node(NodeKey(5), GeoPoint::new(1.0, 1.0));
    let n6 = b.add_charging_station(NodeKey(6), GeoPoint::new(1.0, 2.0));
    b.add_road(n1, n2, 4.0);
    b.add_road(n2, n3, 3.0);
    b.add_road(n1, n4, 7.0);
    b.add_road(n2, n5, 1.0);
    b.add_road(n3, n6, 9.0);
    b.add_road(n4, n5, 2.0);
    b.add_road(n5, n6, 6.0);
    b.build().unwrap()
}

fn keys(raw: &[i64]) -> Vec<NodeKey> {
    raw.iter().copied().map(NodeKey).collect()
}

// ── RangeEstimator ────────────────────────────────────────────────────────────

#[cfg(test)]
mod range {
    use crate::{PlanError, RangeEstimator, estimate_gained_range};

    #[test]
    fn gained_is_duration_times_sixty() {
        for hours in [0.0, 0.25, 1.0, 2.5, 12.0] {
            assert_eq!(estimate_gained_range(hours).unwrap(), hours * 60.0);
        }
    }

    #[test]
    fn negative_duration_rejected() {
        let err = estimate_gained_range(-1.0).unwrap_err();
        assert!(matches!(err, PlanError::InvalidInput { what: "charging duration", value } if value == -1.0));
    }

    #[test]
    fn nan_and_infinite_duration_rejected() {
        assert!(matches!(estimate_gained_range(f64::NAN), Err(PlanError::InvalidInput { .. })));
        assert!(matches!(estimate_gained_range(f64::INFINITY), Err(PlanError::InvalidInput { .. })));
    }

    #[test]
    fn custom_rate() {
        let est = RangeEstimator::new(22.0).unwrap();
        assert_eq!(est.rate_per_hour(), 22.0);
        assert_eq!(est.gained_range(2.0).unwrap(), 44.0);
    }

    #[test]
    fn invalid_rate_rejected() {
        assert!(matches!(RangeEstimator::new(-5.0), Err(PlanError::Config(_))));
        assert!(matches!(RangeEstimator::new(f64::NAN), Err(PlanError::Config(_))));
    }

    #[test]
    fn effective_range_adds_available() {
        let est = RangeEstimator::default();
        assert_eq!(est.effective_range(5.0, 1.0).unwrap(), 65.0);
        assert!(matches!(
            est.effective_range(-5.0, 1.0),
            Err(PlanError::InvalidInput { what: "available range", .. })
        ));
    }
}

// ── Constrained router ────────────────────────────────────────────────────────

#[cfg(test)]
mod planner {
    use super::*;
    use crate::{PlanError, RouteRequest, plan_route};

    #[test]
    fn abc_infeasible_without_charging() {
        let net = abc_network();
        let r = plan_route(&net, &RouteRequest::new(A, C, 5.0, 0.0)).unwrap();
        assert_eq!(r.path, vec![A, B, C]);
        assert_eq!(r.total_distance, 20.0);
        assert_eq!(r.effective_range, 5.0);
        assert!(!r.feasible);
        assert_eq!(r.shortfall(), 15.0);
    }

    #[test]
    fn abc_feasible_after_one_hour_charge() {
        let net = abc_network();
        let r = plan_route(&net, &RouteRequest::new(A, C, 5.0, 1.0)).unwrap();
        assert_eq!(r.path, vec![A, B, C]);
        assert_eq!(r.total_distance, 20.0);
        assert_eq!(r.effective_range, 65.0);
        assert!(r.feasible);
        assert_eq!(r.shortfall(), 0.0);
    }

    #[test]
    fn exact_budget_is_feasible() {
        let net = abc_network();
        let r = plan_route(&net, &RouteRequest::new(A, C, 20.0, 0.0)).unwrap();
        assert!(r.feasible);
    }

    #[test]
    fn same_start_and_end() {
        let net = abc_network();
        for key in [A, B, C, D] {
            let r = plan_route(&net, &RouteRequest::new(key, key, 0.0, 0.0)).unwrap();
            assert_eq!(r.path, vec![key]);
            assert_eq!(r.total_distance, 0.0);
            assert!(r.feasible);
        }
    }

    #[test]
    fn isolated_node_has_no_path() {
        let net = abc_network();
        let err = plan_route(&net, &RouteRequest::new(A, D, 100.0, 0.0)).unwrap_err();
        assert!(matches!(err, PlanError::NoPath { from: A, to: D }));
    }

    #[test]
    fn unknown_nodes_reported_by_key() {
        let net = abc_network();
        let err = plan_route(&net, &RouteRequest::new(NodeKey(99), C, 5.0, 0.0)).unwrap_err();
        assert!(matches!(err, PlanError::NodeNotFound(NodeKey(99))));
        let err = plan_route(&net, &RouteRequest::new(A, NodeKey(98), 5.0, 0.0)).unwrap_err();
        assert!(matches!(err, PlanError::NodeNotFound(NodeKey(98))));
    }

    #[test]
    fn input_validated_before_lookup() {
        let net = abc_network();
        let err = plan_route(&net, &RouteRequest::new(NodeKey(99), C, -1.0, 0.0)).unwrap_err();
        assert!(matches!(err, PlanError::InvalidInput { what: "available range", .. }));
        let err = plan_route(&net, &RouteRequest::new(A, C, 5.0, -0.5)).unwrap_err();
        assert!(matches!(err, PlanError::InvalidInput { what: "charging duration", .. }));
    }

    #[test]
    fn mesh_picks_shortest_path() {
        let net = mesh_network();
        // 4→6: 4-5-6 = 8 beats 4-5-2-3-6 = 15 and 4-1-2-3-6 = 23
        let r = plan_route(&net, &RouteRequest::new(NodeKey(4), NodeKey(6), 0.0, 0.0)).unwrap();
        assert_eq!(r.path, keys(&[4, 5, 6]));
        assert_eq!(r.total_distance, 8.0);
        // 1→3: 1-2-3 = 7 beats 1-4-5-2-3 = 13
        let r = plan_route(&net, &RouteRequest::new(NodeKey(1), NodeKey(3), 0.0, 0.0)).unwrap();
        assert_eq!(r.path, keys(&[1, 2, 3]));
        assert_eq!(r.total_distance, 7.0);
    }

    #[test]
    fn distance_matches_path_and_is_optimal_for_every_pair() {
        let net = mesh_network();
        for start in 1..=6 {
            let source = net.resolve(NodeKey(start)).unwrap();
            let truth = ev_spatial::shortest_distances(&net, source);
            for end in 1..=6 {
                let r = plan_route(&net, &RouteRequest::new(NodeKey(start), NodeKey(end), 0.0, 0.0))
                    .unwrap();

                // Sum of edge lengths along the returned path.
                let mut sum = 0.0;
                for pair in r.path.windows(2) {
                    let step = net
                        .neighbors(pair[0])
                        .unwrap()
                        .filter(|(k, _)| *k == pair[1])
                        .map(|(_, len)| len)
                        .fold(f64::INFINITY, f64::min);
                    assert!(step.is_finite(), "path uses a non-existent edge");
                    sum += step;
                }
                approx::assert_relative_eq!(r.total_distance, sum);

                let best = truth[net.resolve(NodeKey(end)).unwrap().index()].unwrap();
                approx::assert_relative_eq!(r.total_distance, best);
                assert_eq!(r.path.first(), Some(&NodeKey(start)));
                assert_eq!(r.path.last(), Some(&NodeKey(end)));
            }
        }
    }

    #[test]
    fn feasibility_is_monotonic_in_range() {
        let net = mesh_network();
        let mut was_feasible = false;
        for range in [0.0, 5.0, 10.0, 14.0, 15.0, 16.0, 100.0] {
            let r = plan_route(&net, &RouteRequest::new(NodeKey(1), NodeKey(6), range, 0.0))
                .unwrap();
            assert_eq!(r.feasible, r.total_distance <= range);
            assert!(!was_feasible || r.feasible, "range {range} flipped back to infeasible");
            was_feasible = r.feasible;
        }
        assert!(was_feasible);
    }

    #[test]
    fn feasibility_is_monotonic_in_charging_time() {
        let net = abc_network();
        let mut was_feasible = false;
        for hours in [0.0, 0.1, 0.25, 0.5, 2.0] {
            let r = plan_route(&net, &RouteRequest::new(A, C, 5.0, hours)).unwrap();
            assert!(!was_feasible || r.feasible);
            was_feasible = r.feasible;
        }
        // 5 + 0.25 * 60 = 20 exactly reaches C.
        let r = plan_route(&net, &RouteRequest::new(A, C, 5.0, 0.25)).unwrap();
        assert!(r.feasible);
    }

    #[test]
    fn drive_time_absent_without_speeds() {
        let net = abc_network();
        let r = plan_route(&net, &RouteRequest::new(A, C, 5.0, 0.0)).unwrap();
        assert_eq!(r.drive_time_hours, None);
    }
}

// ── Charging station locator ──────────────────────────────────────────────────

#[cfg(test)]
mod locator {
    use super::*;
    use crate::{PlanError, find_nearest_charging_station};

    #[test]
    fn abc_nearest_from_a() {
        let net = abc_network();
        let adv = find_nearest_charging_station(&net, A).unwrap();
        assert_eq!(adv.station, C);
        assert_eq!(adv.distance, 20.0);
        assert_eq!(adv.reference, A);
        assert_eq!(adv.position, GeoPoint::new(28.50, 77.10));
    }

    #[test]
    fn station_is_its_own_nearest() {
        let net = abc_network();
        let adv = find_nearest_charging_station(&net, C).unwrap();
        assert_eq!(adv.station, C);
        assert_eq!(adv.distance, 0.0);
    }

    #[test]
    fn network_distance_not_straight_line() {
        let net = mesh_network();
        // From 5: station 6 is 6 away directly, station 3 is 1 + 3 = 4 via 2.
        let adv = find_nearest_charging_station(&net, NodeKey(5)).unwrap();
        assert_eq!(adv.station, NodeKey(3));
        assert_eq!(adv.distance, 4.0);
        // From 4: 3 via 5-2 is 2 + 1 + 3 = 6, 6 via 5 is 2 + 6 = 8.
        let adv = find_nearest_charging_station(&net, NodeKey(4)).unwrap();
        assert_eq!(adv.station, NodeKey(3));
        assert_eq!(adv.distance, 6.0);
    }

    #[test]
    fn no_closer_station_exists() {
        let net = mesh_network();
        for reference in 1..=6 {
            let source = net.resolve(NodeKey(reference)).unwrap();
            let truth = ev_spatial::shortest_distances(&net, source);
            let best = net
                .charging_stations()
                .iter()
                .filter_map(|s| truth[s.index()])
                .fold(f64::INFINITY, f64::min);
            let adv = find_nearest_charging_station(&net, NodeKey(reference)).unwrap();
            assert!(net.is_charging_station(net.resolve(adv.station).unwrap()));
            assert_eq!(adv.distance, best);
        }
    }

    #[test]
    fn unreachable_station_is_an_error() {
        let net = abc_network();
        let err = find_nearest_charging_station(&net, D).unwrap_err();
        assert!(matches!(err, PlanError::NoChargingStation { reference: D }));
    }

    #[test]
    fn network_without_stations() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(A, GeoPoint::new(0.0, 0.0));
        let c = b.add_node(B, GeoPoint::new(0.0, 1.0));
        b.add_road(a, c, 1.0);
        let net = b.build().unwrap();
        let err = find_nearest_charging_station(&net, A).unwrap_err();
        assert!(matches!(err, PlanError::NoChargingStation { reference: A }));
    }

    #[test]
    fn unknown_reference() {
        let net = abc_network();
        let err = find_nearest_charging_station(&net, NodeKey(42)).unwrap_err();
        assert!(matches!(err, PlanError::NodeNotFound(NodeKey(42))));
    }
}

// ── Trip planning (route + advisory) ──────────────────────────────────────────

#[cfg(test)]
mod trip {
    use super::*;
    use ev_core::NodeId;
    use ev_spatial::{Route, Router, SpatialError};

    use crate::{
        AdvisoryReference, ChargingAdvice, PlanError, PlannerConfig, RouteRequest, RoutePlanner,
    };

    fn origin_planner() -> RoutePlanner {
        RoutePlanner::new(PlannerConfig {
            advisory_reference: AdvisoryReference::Origin,
            ..PlannerConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn feasible_trip_has_no_advice() {
        let net = abc_network();
        let plan = RoutePlanner::default()
            .plan_trip(&net, &RouteRequest::new(A, C, 5.0, 1.0))
            .unwrap();
        assert!(plan.route.feasible);
        assert!(plan.charging.is_none());
    }

    #[test]
    fn infeasible_trip_advises_from_origin() {
        let net = abc_network();
        let plan = origin_planner()
            .plan_trip(&net, &RouteRequest::new(A, C, 5.0, 0.0))
            .unwrap();
        assert!(!plan.route.feasible);
        match plan.charging {
            Some(ChargingAdvice::Nearest(adv)) => {
                assert_eq!(adv.station, C);
                assert_eq!(adv.distance, 20.0);
                assert_eq!(adv.reference, A);
            }
            other => panic!("expected a station, got {other:?}"),
        }
    }

    #[test]
    fn infeasible_trip_advises_from_destination_by_default() {
        let net = mesh_network();
        // 1→5 = 5 via 2; nearest station to 5 is 3 at 4.
        let plan = RoutePlanner::default()
            .plan_trip(&net, &RouteRequest::new(NodeKey(1), NodeKey(5), 1.0, 0.0))
            .unwrap();
        match plan.charging {
            Some(ChargingAdvice::Nearest(adv)) => {
                assert_eq!(adv.reference, NodeKey(5));
                assert_eq!(adv.station, NodeKey(3));
                assert_eq!(adv.distance, 4.0);
            }
            other => panic!("expected a station, got {other:?}"),
        }
    }

    #[test]
    fn locator_failure_is_folded_into_plan() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(A, GeoPoint::new(0.0, 0.0));
        let c = b.add_node(B, GeoPoint::new(0.0, 1.0));
        b.add_road(a, c, 50.0);
        let net = b.build().unwrap();

        let plan = RoutePlanner::default()
            .plan_trip(&net, &RouteRequest::new(A, B, 10.0, 0.0))
            .unwrap();
        assert!(!plan.route.feasible);
        assert!(matches!(
            plan.charging,
            Some(ChargingAdvice::Unavailable { reference: B, .. })
        ));
    }

    #[test]
    fn trip_propagates_route_errors() {
        let net = abc_network();
        let err = RoutePlanner::default()
            .plan_trip(&net, &RouteRequest::new(A, D, 5.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, PlanError::NoPath { .. }));
    }

    #[test]
    fn custom_rate_changes_feasibility() {
        let net = abc_network();
        let slow = RoutePlanner::new(PlannerConfig {
            charge_rate_per_hour: 10.0,
            ..PlannerConfig::default()
        })
        .unwrap();
        let r = slow.plan_route(&net, &RouteRequest::new(A, C, 5.0, 1.0)).unwrap();
        assert_eq!(r.effective_range, 15.0);
        assert!(!r.feasible);
    }

    /// Router that never finds anything.
    struct NoRoads;

    impl Router for NoRoads {
        fn route(&self, _: &RoadNetwork, from: NodeId, to: NodeId) -> Result<Route, SpatialError> {
            Err(SpatialError::NoRoute { from, to })
        }
    }

    #[test]
    fn custom_router_is_used() {
        let net = abc_network();
        let planner = RoutePlanner::with_router(PlannerConfig::default(), NoRoads).unwrap();
        let err = planner.plan_route(&net, &RouteRequest::new(A, C, 5.0, 0.0)).unwrap_err();
        assert!(matches!(err, PlanError::NoPath { from: A, to: C }));
    }

    #[test]
    fn plan_serializes_to_json() {
        let net = abc_network();
        let plan = origin_planner()
            .plan_trip(&net, &RouteRequest::new(A, C, 5.0, 0.0))
            .unwrap();
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["route"]["path"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["route"]["feasible"], serde_json::json!(false));
        assert_eq!(json["charging"]["status"], serde_json::json!("nearest"));
        assert_eq!(json["charging"]["station"], serde_json::json!(3));
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use std::io::Cursor;

    use crate::{AdvisoryReference, DEFAULT_CHARGE_RATE_PER_HOUR, PlanError, PlannerConfig};

    #[test]
    fn defaults() {
        let c = PlannerConfig::default();
        assert_eq!(c.charge_rate_per_hour, DEFAULT_CHARGE_RATE_PER_HOUR);
        assert_eq!(c.advisory_reference, AdvisoryReference::Destination);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_json_uses_defaults() {
        let c = PlannerConfig::from_json_reader(Cursor::new("{}")).unwrap();
        assert_eq!(c, PlannerConfig::default());
    }

    #[test]
    fn json_overrides() {
        let json = r#"{ "charge_rate_per_hour": 45.5, "advisory_reference": "origin" }"#;
        let c = PlannerConfig::from_json_reader(Cursor::new(json)).unwrap();
        assert_eq!(c.charge_rate_per_hour, 45.5);
        assert_eq!(c.advisory_reference, AdvisoryReference::Origin);
    }

    #[test]
    fn unknown_field_rejected() {
        let json = r#"{ "charge_rate": 45.5 }"#;
        assert!(matches!(
            PlannerConfig::from_json_reader(Cursor::new(json)),
            Err(PlanError::Config(_))
        ));
    }

    #[test]
    fn negative_rate_rejected() {
        let json = r#"{ "charge_rate_per_hour": -1 }"#;
        assert!(matches!(
            PlannerConfig::from_json_reader(Cursor::new(json)),
            Err(PlanError::Config(_))
        ));
    }

    #[test]
    fn invalid_rate_rejected_by_validate_and_planner() {
        let c = PlannerConfig { charge_rate_per_hour: f64::NAN, ..PlannerConfig::default() };
        assert!(matches!(c.validate(), Err(PlanError::Config(_))));
        assert!(matches!(crate::RoutePlanner::new(c), Err(PlanError::Config(_))));
    }

    #[test]
    fn from_json_file_reads_and_validates() {
        let dir = std::env::temp_dir();
        let good = dir.join(format!("ev-planner-config-{}.json", std::process::id()));
        std::fs::write(&good, r#"{ "advisory_reference": "origin" }"#).unwrap();
        let c = PlannerConfig::from_json_file(&good).unwrap();
        std::fs::remove_file(&good).unwrap();
        assert_eq!(c.advisory_reference, AdvisoryReference::Origin);
        assert_eq!(c.charge_rate_per_hour, DEFAULT_CHARGE_RATE_PER_HOUR);
    }

    #[test]
    fn from_json_file_missing_is_io_error() {
        let missing = std::env::temp_dir().join("ev-planner-config-does-not-exist.json");
        assert!(matches!(PlannerConfig::from_json_file(&missing), Err(PlanError::Io(_))));
    }
}
