//! Road network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_from[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_length`, `edge_max_speed`)
//! are sorted by source node and indexed by `EdgeId`.
//!
//! # Identifiers
//!
//! Nodes carry the external [`NodeKey`] they were loaded with.  Callers look
//! nodes up by key ([`RoadNetwork::resolve`], [`RoadNetwork::neighbors`]);
//! the search code works on dense [`NodeId`]s.
//!
//! # Units
//!
//! Edge lengths are in whatever distance unit the graph source uses, after
//! [`LoadOptions::length_scale`](crate::LoadOptions) is applied.  Battery
//! ranges passed to the planner must use the same unit.  Speeds are in
//! length units per hour.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId`.  Used
//! to snap geocoded coordinates to road nodes.

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;

use ev_core::{EdgeId, GeoPoint, NodeId, NodeKey};

use crate::{SpatialError, SpatialResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Sufficient for
    /// nearest-node queries within a city.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph in CSR format plus a spatial index for node snapping.
///
/// Immutable once built.  Share it by reference across requests; nothing in
/// the planner writes back into it.  Do not construct directly; use
/// [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Geographic position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    /// External key of each node.  Indexed by `NodeId`.
    pub node_key: Vec<NodeKey>,

    /// `true` if the node offers EV charging.  Indexed by `NodeId`.
    pub node_is_station: Vec<bool>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    /// Source node of each edge.  Needed to trace `prev_edge` back to the
    /// source during route reconstruction.
    pub edge_from: Vec<NodeId>,

    /// Destination node of each edge.
    pub edge_to: Vec<NodeId>,

    /// Length of each edge.  Used as the Dijkstra edge cost.
    pub edge_length: Vec<f64>,

    /// Optional speed limit in length units per hour.
    pub edge_max_speed: Vec<Option<f64>>,

    // ── Lookup tables ─────────────────────────────────────────────────────
    key_index: FxHashMap<NodeKey, NodeId>,
    stations: Vec<NodeId>,
    spatial_idx: RTree<NodeEntry>,
}

impl RoadNetwork {
    /// Construct an empty network with no nodes or edges.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new()
            .build()
            .unwrap_or_else(|_| unreachable!("an empty builder has nothing to validate"))
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    /// Number of nodes flagged as charging stations.
    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    // ── Key lookups ───────────────────────────────────────────────────────

    /// `true` if a node with this external key exists.
    pub fn has_node(&self, key: NodeKey) -> bool {
        self.key_index.contains_key(&key)
    }

    /// Map an external key to its dense `NodeId`.
    pub fn resolve(&self, key: NodeKey) -> SpatialResult<NodeId> {
        self.key_index
            .get(&key)
            .copied()
            .ok_or(SpatialError::UnknownNode(key))
    }

    /// External key of `node`.
    ///
    /// # Panics
    /// Panics if `node` did not come from this network.
    #[inline]
    pub fn key_of(&self, node: NodeId) -> NodeKey {
        self.node_key[node.index()]
    }

    /// `true` if `node` is a valid index into this network.
    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    #[inline]
    pub fn position(&self, node: NodeId) -> GeoPoint {
        self.node_pos[node.index()]
    }

    #[inline]
    pub fn is_charging_station(&self, node: NodeId) -> bool {
        self.node_is_station[node.index()]
    }

    /// All charging-station nodes, in `NodeId` order.
    pub fn charging_stations(&self) -> &[NodeId] {
        &self.stations
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// This is a contiguous index range, no heap allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Out-degree of `node` (number of outgoing edges).
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// Outgoing neighbours of the node with external key `key`, paired with
    /// the length of the connecting edge.
    ///
    /// Parallel edges yield the neighbour once per edge.
    pub fn neighbors(
        &self,
        key: NodeKey,
    ) -> SpatialResult<impl Iterator<Item = (NodeKey, f64)> + '_> {
        let node = self.resolve(key)?;
        Ok(self.out_edges(node).map(move |e| {
            (self.key_of(self.edge_to[e.index()]), self.edge_length[e.index()])
        }))
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` of the nearest road node to `pos`.
    ///
    /// Returns `None` if the network has no nodes or `pos` is not a valid
    /// coordinate.
    pub fn snap_to_node(&self, pos: GeoPoint) -> Option<NodeId> {
        if !pos.is_valid() {
            return None;
        }
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }

    /// Return up to `k` nearest nodes to `pos`, sorted by ascending distance.
    /// Empty for an invalid `pos`.
    pub fn k_nearest_nodes(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        if !pos.is_valid() {
            return Vec::new();
        }
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.lat, pos.lon])
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes and directed edges in any order.  `build()`
/// validates the graph, sorts edges by source node, constructs the CSR
/// arrays, and bulk-loads the R-tree.
///
/// # Example
///
/// ```
/// use ev_core::{GeoPoint, NodeKey};
/// use ev_spatial::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(NodeKey(1), GeoPoint::new(28.61, 77.20));
/// let c = b.add_charging_station(NodeKey(2), GeoPoint::new(28.47, 77.03));
/// b.add_road(a, c, 32.0);
/// let net = b.build().unwrap();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// assert_eq!(net.station_count(), 1);
/// ```
pub struct RoadNetworkBuilder {
    nodes:      Vec<RawNode>,
    raw_edges:  Vec<RawEdge>,
    key_index:  FxHashMap<NodeKey, NodeId>,
    duplicates: Vec<NodeKey>,
}

struct RawNode {
    key:     NodeKey,
    pos:     GeoPoint,
    station: bool,
}

struct RawEdge {
    from:      NodeId,
    to:        NodeId,
    length:    f64,
    max_speed: Option<f64>,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self {
            nodes:      Vec::new(),
            raw_edges:  Vec::new(),
            key_index:  FxHashMap::default(),
            duplicates: Vec::new(),
        }
    }

    /// Pre-allocate for the expected number of nodes and edges to reduce
    /// reallocations when bulk-loading.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        let mut key_index = FxHashMap::default();
        key_index.reserve(nodes);
        Self {
            nodes:      Vec::with_capacity(nodes),
            raw_edges:  Vec::with_capacity(edges),
            key_index,
            duplicates: Vec::new(),
        }
    }

    /// Add a road node and return its `NodeId` (sequential from 0).
    ///
    /// A repeated `key` is recorded and reported by [`build`](Self::build).
    pub fn add_node(&mut self, key: NodeKey, pos: GeoPoint) -> NodeId {
        self.push_node(key, pos, false)
    }

    /// Add a node that offers EV charging.
    pub fn add_charging_station(&mut self, key: NodeKey, pos: GeoPoint) -> NodeId {
        self.push_node(key, pos, true)
    }

    fn push_node(&mut self, key: NodeKey, pos: GeoPoint, station: bool) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        if self.key_index.insert(key, id).is_some() {
            self.duplicates.push(key);
        }
        self.nodes.push(RawNode { key, pos, station });
        id
    }

    /// Add a **directed** edge from `from` to `to` with the given length.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, length: f64) {
        self.raw_edges.push(RawEdge { from, to, length, max_speed: None });
    }

    /// Like [`add_directed_edge`](Self::add_directed_edge) with a speed limit
    /// in length units per hour.  Non-positive or non-finite speeds are
    /// treated as unknown.
    pub fn add_directed_edge_with_speed(
        &mut self,
        from: NodeId,
        to: NodeId,
        length: f64,
        max_speed: f64,
    ) {
        let max_speed = Some(max_speed).filter(|s| s.is_finite() && *s > 0.0);
        self.raw_edges.push(RawEdge { from, to, length, max_speed });
    }

    /// Convenience: add edges in **both directions** for an undirected road
    /// segment.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length: f64) {
        self.add_directed_edge(a, b, length);
        self.add_directed_edge(b, a, length);
    }

    /// Two-way road segment with a speed limit.
    pub fn add_road_with_speed(&mut self, a: NodeId, b: NodeId, length: f64, max_speed: f64) {
        self.add_directed_edge_with_speed(a, b, length, max_speed);
        self.add_directed_edge_with_speed(b, a, length, max_speed);
    }

    /// Look up the `NodeId` assigned to an external key added earlier.
    pub fn node_id(&self, key: NodeKey) -> Option<NodeId> {
        self.key_index.get(&key).copied()
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// # Errors
    ///
    /// - [`SpatialError::DuplicateNode`] if a key was added twice.
    /// - [`SpatialError::InvalidCoordinate`] for a non-finite or
    ///   out-of-range node position.
    /// - [`SpatialError::EdgeEndpoint`] if an edge references a `NodeId`
    ///   that was never returned by this builder.
    /// - [`SpatialError::InvalidEdgeLength`] for negative, NaN, or infinite
    ///   lengths (Dijkstra requires non-negative weights).
    ///
    /// Time complexity: O(E log E) for edge sort + O(N log N) for R-tree bulk
    /// load, where N = nodes, E = edges.
    pub fn build(self) -> SpatialResult<RoadNetwork> {
        if let Some(&key) = self.duplicates.first() {
            return Err(SpatialError::DuplicateNode(key));
        }
        if let Some(n) = self.nodes.iter().find(|n| !n.pos.is_valid()) {
            return Err(SpatialError::InvalidCoordinate { key: n.key, pos: n.pos });
        }

        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        for e in &self.raw_edges {
            if e.from.index() >= node_count || e.to.index() >= node_count {
                return Err(SpatialError::EdgeEndpoint { from: e.from, to: e.to });
            }
            if !e.length.is_finite() || e.length < 0.0 {
                return Err(SpatialError::InvalidEdgeLength {
                    from:   self.nodes[e.from.index()].key,
                    to:     self.nodes[e.to.index()].key,
                    length: e.length,
                });
            }
        }

        // Stable sort keeps insertion order among a node's edges, so
        // equal-cost ties resolve the same way on every build.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_from:      Vec<NodeId>      = raw.iter().map(|e| e.from).collect();
        let edge_to:        Vec<NodeId>      = raw.iter().map(|e| e.to).collect();
        let edge_length:    Vec<f64>         = raw.iter().map(|e| e.length).collect();
        let edge_max_speed: Vec<Option<f64>> = raw.iter().map(|e| e.max_speed).collect();

        // Build CSR row pointer (node_out_start).
        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| NodeEntry {
                point: [n.pos.lat, n.pos.lon],
                id: NodeId(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        let stations: Vec<NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.station)
            .map(|(i, _)| NodeId(i as u32))
            .collect();

        Ok(RoadNetwork {
            node_pos:        self.nodes.iter().map(|n| n.pos).collect(),
            node_key:        self.nodes.iter().map(|n| n.key).collect(),
            node_is_station: self.nodes.iter().map(|n| n.station).collect(),
            node_out_start,
            edge_from,
            edge_to,
            edge_length,
            edge_max_speed,
            key_index: self.key_index,
            stations,
            spatial_idx,
        })
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
