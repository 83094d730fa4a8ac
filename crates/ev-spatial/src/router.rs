//! Routing trait, default Dijkstra implementation, and single-source search.
//!
//! # Pluggability
//!
//! `ev-planner` calls point-to-point routing via the [`Router`] trait, so
//! applications can swap in custom implementations (A*, contraction
//! hierarchies) without touching the planner.  The default
//! [`DijkstraRouter`] is sufficient for city-scale networks.
//!
//! # Cost
//!
//! Edge cost is `edge_length`.  Lengths are validated non-negative at build
//! time, which is what makes Dijkstra's greedy settle order correct.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::ops::ControlFlow;

use ordered_float::OrderedFloat;
use tracing::debug;

use ev_core::{EdgeId, NodeId};

use crate::network::RoadNetwork;
use crate::SpatialError;

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query: the node sequence, the edges between them,
/// and the total length.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Nodes visited in order, from source to destination inclusive.
    pub nodes: Vec<NodeId>,
    /// Edges to traverse in order.  Always `nodes.len() - 1` long.
    pub edges: Vec<EdgeId>,
    /// Sum of `edge_length` over `edges`.
    pub total_length: f64,
}

impl Route {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    /// Estimated driving time in hours at each edge's speed limit.
    ///
    /// `None` if any traversed edge has no speed attribute.
    pub fn drive_time_hours(&self, network: &RoadNetwork) -> Option<f64> {
        self.edges.iter().try_fold(0.0, |acc, e| {
            network.edge_max_speed[e.index()]
                .map(|speed| acc + network.edge_length[e.index()] / speed)
        })
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable point-to-point routing engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so a single router can serve
/// concurrent requests against a shared network.
pub trait Router: Send + Sync {
    /// Compute the shortest route from `from` to `to` by edge length.
    ///
    /// `from == to` yields a single-node route of length zero.
    ///
    /// # Errors
    ///
    /// [`SpatialError::NodeNotFound`] if either id is outside the network,
    /// [`SpatialError::NoRoute`] if `to` is unreachable from `from`.
    fn route(
        &self,
        network: &RoadNetwork,
        from: NodeId,
        to: NodeId,
    ) -> Result<Route, SpatialError>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the CSR road graph, terminating as soon
/// as the target is settled.
///
/// Equal-length ties are broken by heap order (lower `NodeId` first), which
/// is deterministic for a given network but otherwise arbitrary.
#[derive(Debug, Clone, Copy, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(
        &self,
        network: &RoadNetwork,
        from: NodeId,
        to: NodeId,
    ) -> Result<Route, SpatialError> {
        for node in [from, to] {
            if !network.contains(node) {
                return Err(SpatialError::NodeNotFound(node));
            }
        }

        if from == to {
            return Ok(Route { nodes: vec![from], edges: vec![], total_length: 0.0 });
        }

        let search = dijkstra(network, from, |node, _| {
            if node == to { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
        });

        let total = search.dist[to.index()];
        if total.is_infinite() {
            debug!(%from, %to, "target unreachable");
            return Err(SpatialError::NoRoute { from, to });
        }

        Ok(reconstruct(network, &search.prev_edge, from, to, total))
    }
}

// ── Single-source queries ─────────────────────────────────────────────────────

/// Shortest distance from `source` to every node, `None` where unreachable.
///
/// # Panics
/// Panics if `source` is not a node of `network`.
pub fn shortest_distances(network: &RoadNetwork, source: NodeId) -> Vec<Option<f64>> {
    let search = dijkstra(network, source, |_, _| ControlFlow::Continue(()));
    search
        .dist
        .into_iter()
        .map(|d| if d.is_finite() { Some(d) } else { None })
        .collect()
}

/// The closest node to `source` (by network distance) for which `accept`
/// returns `true`, together with its distance.
///
/// Nodes are tested in the order Dijkstra settles them, i.e. by
/// non-decreasing distance, so the first match is a nearest one.  `source`
/// itself is tested first at distance zero.
///
/// # Panics
/// Panics if `source` is not a node of `network`.
pub fn nearest_matching<F>(
    network: &RoadNetwork,
    source: NodeId,
    mut accept: F,
) -> Option<(NodeId, f64)>
where
    F: FnMut(NodeId) -> bool,
{
    let mut found = None;
    let search = dijkstra(network, source, |node, cost| {
        if accept(node) {
            found = Some((node, cost));
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    debug!(
        %source,
        settled = search.settled,
        found = found.is_some(),
        "nearest-match search finished"
    );
    found
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

struct Search {
    /// dist[v] = best known length to reach v; `INFINITY` if unreached.
    dist:      Vec<f64>,
    /// prev_edge[v] = EdgeId that reached v; EdgeId::INVALID for the source
    /// and unreached nodes.
    prev_edge: Vec<EdgeId>,
    settled:   usize,
}

/// Run Dijkstra from `source`, calling `on_settle` once per node in
/// non-decreasing distance order.  Stops early when it returns `Break`.
fn dijkstra<F>(network: &RoadNetwork, source: NodeId, mut on_settle: F) -> Search
where
    F: FnMut(NodeId, f64) -> ControlFlow<()>,
{
    let n = network.node_count();
    let mut dist      = vec![f64::INFINITY; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];
    let mut settled   = 0usize;

    dist[source.index()] = 0.0;

    // Min-heap: (cost, node). Reverse makes BinaryHeap (max) behave as min-heap.
    // Secondary key NodeId ensures deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((OrderedFloat(0.0), source)));

    while let Some(Reverse((OrderedFloat(cost), node))) = heap.pop() {
        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        settled += 1;
        if on_settle(node, cost).is_break() {
            break;
        }

        for edge in network.out_edges(node) {
            let neighbor = network.edge_to[edge.index()];
            let new_cost = cost + network.edge_length[edge.index()];

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((OrderedFloat(new_cost), neighbor)));
            }
        }
    }

    Search { dist, prev_edge, settled }
}

fn reconstruct(
    network: &RoadNetwork,
    prev_edge: &[EdgeId],
    from: NodeId,
    to: NodeId,
    total_length: f64,
) -> Route {
    let mut edges = Vec::new();
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        debug_assert_ne!(e, EdgeId::INVALID, "reached node has no predecessor");
        edges.push(e);
        cur = network.edge_from[e.index()];
    }
    edges.reverse();

    let mut nodes = Vec::with_capacity(edges.len() + 1);
    nodes.push(from);
    nodes.extend(edges.iter().map(|e| network.edge_to[e.index()]));

    Route { nodes, edges, total_length }
}
