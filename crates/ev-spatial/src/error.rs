//! Spatial-subsystem error type.

use thiserror::Error;

use ev_core::{GeoPoint, NodeId, NodeKey};

/// Errors produced by `ev-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("node key {0} not found in network")]
    UnknownNode(NodeKey),

    #[error("node key {0} appears more than once")]
    DuplicateNode(NodeKey),

    #[error("node {key} has invalid coordinate {pos}")]
    InvalidCoordinate { key: NodeKey, pos: GeoPoint },

    #[error("edge {from} -> {to} has invalid length {length} (must be finite and non-negative)")]
    InvalidEdgeLength { from: NodeKey, to: NodeKey, length: f64 },

    #[error("edge {from} -> {to} references a node that was never added")]
    EdgeEndpoint { from: NodeId, to: NodeId },

    #[error("network parse error: {0}")]
    Parse(String),

    #[error("loader configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
