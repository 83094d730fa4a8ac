//! Charging-time → range conversion.
//!
//! A linear approximation: every hour on the charger adds a fixed amount of
//! range.  No taper, temperature, or battery-capacity ceiling is modelled.

use ev_core::ensure_non_negative;

use crate::{PlanError, PlanResult};

/// Range gained per hour of charging when nothing else is configured.
pub const DEFAULT_CHARGE_RATE_PER_HOUR: f64 = 60.0;

/// Range gained by charging for `charging_hours` at the default rate.
///
/// ```
/// use ev_planner::estimate_gained_range;
///
/// assert_eq!(estimate_gained_range(1.5).unwrap(), 90.0);
/// assert!(estimate_gained_range(-1.0).is_err());
/// ```
pub fn estimate_gained_range(charging_hours: f64) -> PlanResult<f64> {
    RangeEstimator::default().gained_range(charging_hours)
}

/// Linear charge-rate model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeEstimator {
    rate_per_hour: f64,
}

impl RangeEstimator {
    pub fn new(rate_per_hour: f64) -> PlanResult<Self> {
        if !rate_per_hour.is_finite() || rate_per_hour < 0.0 {
            return Err(PlanError::Config(format!(
                "charge rate must be finite and non-negative, got {rate_per_hour}"
            )));
        }
        Ok(Self { rate_per_hour })
    }

    pub fn rate_per_hour(&self) -> f64 {
        self.rate_per_hour
    }

    /// `charging_hours * rate`.  Negative, NaN, and infinite durations are
    /// rejected with [`PlanError::InvalidInput`].
    pub fn gained_range(&self, charging_hours: f64) -> PlanResult<f64> {
        let hours = ensure_non_negative("charging duration", charging_hours)?;
        if hours.is_infinite() {
            return Err(PlanError::InvalidInput { what: "charging duration", value: hours });
        }
        Ok(hours * self.rate_per_hour)
    }

    /// Range available before departure: what the battery already holds plus
    /// what the charging stop adds.
    pub fn effective_range(&self, available_range: f64, charging_hours: f64) -> PlanResult<f64> {
        let available = ensure_non_negative("available range", available_range)?;
        Ok(available + self.gained_range(charging_hours)?)
    }
}

impl Default for RangeEstimator {
    fn default() -> Self {
        Self { rate_per_hour: DEFAULT_CHARGE_RATE_PER_HOUR }
    }
}
