//! Planner error type.

use thiserror::Error;

use ev_core::{CoreError, NodeKey};
use ev_spatial::SpatialError;

/// Errors produced by `ev-planner`.  None are transient; callers should
/// report them rather than retry.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("node {0} not found in road network")]
    NodeNotFound(NodeKey),

    #[error("no path from node {from} to node {to}")]
    NoPath { from: NodeKey, to: NodeKey },

    #[error("invalid {what}: {value} (must be a finite, non-negative number)")]
    InvalidInput { what: &'static str, value: f64 },

    #[error("no charging station reachable from node {reference}")]
    NoChargingStation { reference: NodeKey },

    #[error("planner configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

impl From<CoreError> for PlanError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidInput { what, value } => PlanError::InvalidInput { what, value },
        }
    }
}

pub type PlanResult<T> = Result<T, PlanError>;
