//! `ev-planner` — range-feasibility routing for electric vehicles.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                        |
//! |---------------|-----------------------------------------------------------------|
//! | [`range`]     | `RangeEstimator`, `estimate_gained_range`                       |
//! | [`planner`]   | `RoutePlanner`, `plan_route`                                    |
//! | [`locator`]   | `find_nearest_charging_station`                                 |
//! | [`request`]   | `RouteRequest`, `RouteResult`, `ChargingStopAdvisory`, `TripPlan` |
//! | [`config`]    | `PlannerConfig`, `AdvisoryReference`                            |
//! | [`error`]     | `PlanError`, `PlanResult<T>`                                    |
//!
//! # Flow
//!
//! ```text
//! RouteRequest ──► RangeEstimator ──► effective range
//!              └─► Router (unconstrained shortest path) ──► RouteResult
//!                                     feasible? ── no ──► locator ──► ChargingAdvice
//! ```
//!
//! The shortest path is computed without regard to the budget and only then
//! compared against it.  The planner never searches for a longer path that
//! happens to fit.

pub mod config;
pub mod error;
pub mod locator;
pub mod planner;
pub mod range;
pub mod request;

#[cfg(test)]
mod tests;

pub use config::{AdvisoryReference, PlannerConfig};
pub use error::{PlanError, PlanResult};
pub use locator::find_nearest_charging_station;
pub use planner::{RoutePlanner, plan_route};
pub use range::{DEFAULT_CHARGE_RATE_PER_HOUR, RangeEstimator, estimate_gained_range};
pub use request::{ChargingAdvice, ChargingStopAdvisory, RouteRequest, RouteResult, TripPlan};
