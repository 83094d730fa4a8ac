//! Range-feasibility route planner.
//!
//! The planner does three things per request, in order:
//!
//! 1. validate the request and compute the effective range (no traversal
//!    happens if this fails);
//! 2. find the unconstrained shortest path with the configured [`Router`];
//! 3. compare its length against the effective range.
//!
//! [`RoutePlanner::plan_trip`] additionally attaches charging advice when the
//! route does not fit.

use tracing::{info, warn};

use ev_core::{NodeId, NodeKey};
use ev_spatial::{DijkstraRouter, RoadNetwork, Router, SpatialError};

use crate::config::{AdvisoryReference, PlannerConfig};
use crate::locator::find_nearest_charging_station;
use crate::range::RangeEstimator;
use crate::request::{ChargingAdvice, RouteRequest, RouteResult, TripPlan};
use crate::{PlanError, PlanResult};

/// Plan a route with the default configuration and [`DijkstraRouter`].
pub fn plan_route(network: &RoadNetwork, request: &RouteRequest) -> PlanResult<RouteResult> {
    RoutePlanner::default().plan_route(network, request)
}

/// Route planner, generic over the path-finding engine.
///
/// Holds no per-request state, so one planner can serve any number of
/// requests (concurrently, if `R` allows) against a shared network.
pub struct RoutePlanner<R: Router = DijkstraRouter> {
    config:    PlannerConfig,
    estimator: RangeEstimator,
    router:    R,
}

impl RoutePlanner<DijkstraRouter> {
    pub fn new(config: PlannerConfig) -> PlanResult<Self> {
        Self::with_router(config, DijkstraRouter)
    }
}

impl Default for RoutePlanner<DijkstraRouter> {
    fn default() -> Self {
        Self {
            config:    PlannerConfig::default(),
            estimator: RangeEstimator::default(),
            router:    DijkstraRouter,
        }
    }
}

impl<R: Router> RoutePlanner<R> {
    /// Build a planner around a custom [`Router`].
    pub fn with_router(config: PlannerConfig, router: R) -> PlanResult<Self> {
        let estimator = RangeEstimator::new(config.charge_rate_per_hour)?;
        Ok(Self { config, estimator, router })
    }

    /// Compute the shortest route for `request` and flag its feasibility.
    ///
    /// `start == end` yields the single-node path with distance zero, which
    /// is always feasible.
    ///
    /// # Errors
    ///
    /// - [`PlanError::InvalidInput`] for a negative or NaN range or duration.
    /// - [`PlanError::NodeNotFound`] if either key is not in the network.
    /// - [`PlanError::NoPath`] if `end` is unreachable from `start`.
    pub fn plan_route(
        &self,
        network: &RoadNetwork,
        request: &RouteRequest,
    ) -> PlanResult<RouteResult> {
        let effective_range = self
            .estimator
            .effective_range(request.available_range, request.charging_hours)?;

        let from = resolve_key(network, request.start)?;
        let to = resolve_key(network, request.end)?;

        let route = self.router.route(network, from, to).map_err(|e| match e {
            SpatialError::NoRoute { .. } => PlanError::NoPath { from: request.start, to: request.end },
            other => PlanError::Spatial(other),
        })?;

        let feasible = route.total_length <= effective_range;

        info!(
            start = %request.start,
            end = %request.end,
            hops = route.edges.len(),
            distance = route.total_length,
            effective_range,
            feasible,
            "route planned"
        );

        Ok(RouteResult {
            path:             route.nodes.iter().map(|&n| network.key_of(n)).collect(),
            total_distance:   route.total_length,
            effective_range,
            feasible,
            drive_time_hours: route.drive_time_hours(network),
        })
    }

    /// [`plan_route`](Self::plan_route), then, if the route is infeasible,
    /// look up the nearest charging station from the configured reference
    /// node.
    ///
    /// A failed station lookup does not fail the plan; it is reported as
    /// [`ChargingAdvice::Unavailable`].
    pub fn plan_trip(&self, network: &RoadNetwork, request: &RouteRequest) -> PlanResult<TripPlan> {
        let route = self.plan_route(network, request)?;
        if route.feasible {
            return Ok(TripPlan { route, charging: None });
        }

        let reference = match self.config.advisory_reference {
            AdvisoryReference::Origin => request.start,
            AdvisoryReference::Destination => request.end,
        };

        let advice = match find_nearest_charging_station(network, reference) {
            Ok(advisory) => ChargingAdvice::Nearest(advisory),
            Err(e @ PlanError::NoChargingStation { .. }) => {
                warn!(%reference, "route infeasible and no charging station reachable");
                ChargingAdvice::Unavailable { reference, reason: e.to_string() }
            }
            Err(e) => return Err(e),
        };

        Ok(TripPlan { route, charging: Some(advice) })
    }
}

/// Map an external key to a `NodeId`, reporting unknown keys as
/// [`PlanError::NodeNotFound`].
pub(crate) fn resolve_key(network: &RoadNetwork, key: NodeKey) -> PlanResult<NodeId> {
    network.resolve(key).map_err(|_| PlanError::NodeNotFound(key))
}
