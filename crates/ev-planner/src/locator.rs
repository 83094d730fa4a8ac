//! Nearest charging station by network distance.

use tracing::debug;

use ev_core::NodeKey;
use ev_spatial::{RoadNetwork, nearest_matching};

use crate::planner::resolve_key;
use crate::request::ChargingStopAdvisory;
use crate::{PlanError, PlanResult};

/// Find the charging station with the smallest shortest-path distance from
/// `reference`.
///
/// Distance is measured along the road network, never straight-line.  If
/// `reference` is itself a station it is returned at distance zero.  Among
/// equally distant stations the first one settled by the search wins.
///
/// # Errors
///
/// - [`PlanError::NodeNotFound`] if `reference` is not in the network.
/// - [`PlanError::NoChargingStation`] if the network has no stations, or
///   none is reachable from `reference`.
pub fn find_nearest_charging_station(
    network: &RoadNetwork,
    reference: NodeKey,
) -> PlanResult<ChargingStopAdvisory> {
    let source = resolve_key(network, reference)?;

    if network.station_count() == 0 {
        return Err(PlanError::NoChargingStation { reference });
    }

    let (station, distance) = nearest_matching(network, source, |n| network.is_charging_station(n))
        .ok_or(PlanError::NoChargingStation { reference })?;

    debug!(%reference, station = %network.key_of(station), distance, "nearest charging station");

    Ok(ChargingStopAdvisory {
        station: network.key_of(station),
        position: network.position(station),
        reference,
        distance,
    })
}
