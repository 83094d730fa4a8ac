//! Per-request input and output types.
//!
//! All of these are plain data: constructed fresh for each planning call,
//! never mutated afterwards, and serializable for the presentation layer.

use serde::{Deserialize, Serialize};

use ev_core::{GeoPoint, NodeKey};

/// One route-planning invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: NodeKey,
    pub end: NodeKey,
    /// Range the battery holds at departure, in network length units.
    pub available_range: f64,
    /// Hours spent charging before departure.
    pub charging_hours: f64,
}

impl RouteRequest {
    pub fn new(start: NodeKey, end: NodeKey, available_range: f64, charging_hours: f64) -> Self {
        Self { start, end, available_range, charging_hours }
    }
}

/// The globally shortest route between the requested nodes, annotated with
/// whether it fits the effective range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    /// Node keys from start to end inclusive.
    pub path: Vec<NodeKey>,
    /// Sum of edge lengths along `path`.
    pub total_distance: f64,
    /// Available range plus range gained from charging.
    pub effective_range: f64,
    /// `total_distance <= effective_range`.
    pub feasible: bool,
    /// Driving time at posted speeds; `None` when any edge lacks a speed.
    pub drive_time_hours: Option<f64>,
}

impl RouteResult {
    /// Distance by which the route exceeds the effective range, or zero.
    pub fn shortfall(&self) -> f64 {
        (self.total_distance - self.effective_range).max(0.0)
    }
}

/// Nearest charging station to a reference node, by network distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargingStopAdvisory {
    pub station: NodeKey,
    pub position: GeoPoint,
    pub reference: NodeKey,
    /// Shortest-path distance from `reference` to `station`.
    pub distance: f64,
}

/// Outcome of the charging-station lookup attached to an infeasible plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChargingAdvice {
    Nearest(ChargingStopAdvisory),
    /// No station could be reached from `reference`.
    Unavailable { reference: NodeKey, reason: String },
}

/// A route plus, when it is infeasible, charging advice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripPlan {
    pub route: RouteResult,
    /// Always `None` for feasible routes.
    pub charging: Option<ChargingAdvice>,
}
