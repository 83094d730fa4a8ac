//! Planner configuration.
//!
//! Typically loaded from a JSON file by the application and passed to
//! [`RoutePlanner::new`](crate::RoutePlanner::new).  Every field has a
//! default, so `{}` is a valid configuration.
//!
//! ```json
//! {
//!   "charge_rate_per_hour": 60.0,
//!   "advisory_reference": "destination"
//! }
//! ```

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::range::{DEFAULT_CHARGE_RATE_PER_HOUR, RangeEstimator};
use crate::{PlanError, PlanResult};

/// Which end of the trip the charging-station search starts from when a
/// route is infeasible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryReference {
    /// Nearest station to the start node.
    Origin,
    /// Nearest station to the end node.
    #[default]
    Destination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// Range gained per hour of charging, in network length units.
    /// Default: 60.
    pub charge_rate_per_hour: f64,

    /// Reference node for the charging advisory.  Default: destination.
    pub advisory_reference: AdvisoryReference,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            charge_rate_per_hour: DEFAULT_CHARGE_RATE_PER_HOUR,
            advisory_reference:   AdvisoryReference::default(),
        }
    }
}

impl PlannerConfig {
    /// Reject configurations the planner cannot run with.
    pub fn validate(&self) -> PlanResult<()> {
        RangeEstimator::new(self.charge_rate_per_hour).map(|_| ())
    }

    /// Parse and validate a JSON configuration from any reader.
    pub fn from_json_reader<R: Read>(reader: R) -> PlanResult<Self> {
        let config: PlannerConfig = serde_json::from_reader(reader)
            .map_err(|e| PlanError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON configuration file.
    pub fn from_json_file(path: &Path) -> PlanResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }
}
