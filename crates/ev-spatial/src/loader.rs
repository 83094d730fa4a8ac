//! CSV road-network loader.
//!
//! # Nodes CSV
//!
//! ```csv
//! id,lat,lon,charging_station
//! 1001,28.6139,77.2090,false
//! 1002,28.5355,77.3910,yes
//! ```
//!
//! `charging_station` accepts `true`/`false`, `yes`/`no`, `1`/`0`; an empty
//! value or a missing column means "no".
//!
//! # Edges CSV
//!
//! ```csv
//! from,to,length,oneway,max_speed
//! 1001,1002,1520.5,false,50
//! ```
//!
//! `oneway` (default `false`) controls whether the reverse direction is also
//! added.  `max_speed` is optional and expressed in length units per hour
//! *after* scaling.  Both columns may be omitted entirely.
//!
//! # Units
//!
//! Every raw `length` is multiplied by [`LoadOptions::length_scale`], so a
//! metre-based export can be planned against a range in kilometres with
//! `length_scale = 0.001`.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use ev_core::{GeoPoint, NodeKey};

use crate::network::{RoadNetwork, RoadNetworkBuilder};
use crate::{SpatialError, SpatialResult};

// ── Options ───────────────────────────────────────────────────────────────────

/// Options applied while loading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    /// Multiplier applied to every raw edge length.  Default: 1.0.
    pub length_scale: f64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { length_scale: 1.0 }
    }
}

impl LoadOptions {
    fn validate(&self) -> SpatialResult<()> {
        if self.length_scale.is_finite() && self.length_scale > 0.0 {
            Ok(())
        } else {
            Err(SpatialError::Config(format!(
                "length_scale must be finite and positive, got {}",
                self.length_scale
            )))
        }
    }
}

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    id:  i64,
    lat: f64,
    lon: f64,
    #[serde(default)]
    charging_station: String,
}

#[derive(Deserialize)]
struct EdgeRecord {
    from:   i64,
    to:     i64,
    length: f64,
    #[serde(default)]
    oneway: String,
    #[serde(default)]
    max_speed: Option<f64>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a [`RoadNetwork`] from a pair of CSV files.
pub fn load_network_csv(
    nodes_path: &Path,
    edges_path: &Path,
    options: &LoadOptions,
) -> SpatialResult<RoadNetwork> {
    let nodes = std::fs::File::open(nodes_path)?;
    let edges = std::fs::File::open(edges_path)?;
    load_network_reader(nodes, edges, options)
}

/// Like [`load_network_csv`] but accepts any `Read` sources.
///
/// Useful for testing (pass a `std::io::Cursor`) or loading from network
/// streams.
pub fn load_network_reader<N: Read, E: Read>(
    nodes: N,
    edges: E,
    options: &LoadOptions,
) -> SpatialResult<RoadNetwork> {
    options.validate()?;

    let node_rows: Vec<NodeRecord> = csv::Reader::from_reader(nodes)
        .deserialize::<NodeRecord>()
        .collect::<Result<_, _>>()
        .map_err(|e| SpatialError::Parse(e.to_string()))?;
    let edge_rows: Vec<EdgeRecord> = csv::Reader::from_reader(edges)
        .deserialize::<EdgeRecord>()
        .collect::<Result<_, _>>()
        .map_err(|e| SpatialError::Parse(e.to_string()))?;

    // Two-way rows become two directed edges.
    let mut builder = RoadNetworkBuilder::with_capacity(node_rows.len(), edge_rows.len() * 2);

    // ── Nodes ─────────────────────────────────────────────────────────────
    for row in node_rows {
        let key = NodeKey(row.id);
        let pos = GeoPoint::new(row.lat, row.lon);
        if !pos.is_valid() {
            return Err(SpatialError::Parse(format!("node {key} has invalid coordinate {pos}")));
        }
        if parse_flag("charging_station", &row.charging_station)? {
            builder.add_charging_station(key, pos);
        } else {
            builder.add_node(key, pos);
        }
    }

    // ── Edges ─────────────────────────────────────────────────────────────
    for row in edge_rows {
        let from = builder
            .node_id(NodeKey(row.from))
            .ok_or(SpatialError::UnknownNode(NodeKey(row.from)))?;
        let to = builder
            .node_id(NodeKey(row.to))
            .ok_or(SpatialError::UnknownNode(NodeKey(row.to)))?;

        let length = row.length * options.length_scale;
        let oneway = parse_flag("oneway", &row.oneway)?;

        match (row.max_speed, oneway) {
            (Some(speed), true)  => builder.add_directed_edge_with_speed(from, to, length, speed),
            (Some(speed), false) => builder.add_road_with_speed(from, to, length, speed),
            (None, true)         => builder.add_directed_edge(from, to, length),
            (None, false)        => builder.add_road(from, to, length),
        }
    }

    debug!(
        nodes = builder.node_count(),
        edges = builder.edge_count(),
        length_scale = options.length_scale,
        "road network parsed"
    );

    builder.build()
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_flag(column: &str, s: &str) -> SpatialResult<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "0" => Ok(false),
        "true" | "yes" | "1"      => Ok(true),
        other => Err(SpatialError::Parse(format!(
            "invalid {column} value {other:?}: expected true/false, yes/no, or 1/0"
        ))),
    }
}
