//! Weighted, directed, geocoded road network and the queries the planners need.
//!
//! The graph is built once per planning session and only read afterwards.
//! Node ids are opaque (OSM ids in practice); internally nodes live in a
//! dense vector in insertion order, which also fixes every tie-break.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::error::GraphError;
use crate::haversine::haversine_m;
use crate::route::Route;

/// Opaque road node identifier.
pub type NodeId = u64;

/// A road node. `x` is longitude, `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
}

impl Node {
    /// Location as (lat, lng).
    pub fn coords(&self) -> (f64, f64) {
        (self.y, self.x)
    }
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    to: usize,
    length: f64,
}

/// Upper bound on the work a single shortest-path search may do.
///
/// Unbounded by default. A search that runs out of budget fails with
/// [`GraphError::BudgetExhausted`], which callers treat like an unreachable
/// target.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchBudget {
    pub max_settled_nodes: Option<usize>,
    pub time_limit: Option<Duration>,
}

impl SearchBudget {
    /// No limit on settled nodes or wall time.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Stop after settling `max` nodes.
    pub fn settled_nodes(max: usize) -> Self {
        Self {
            max_settled_nodes: Some(max),
            time_limit: None,
        }
    }

    /// Stop once a search has run for `limit`.
    pub fn time_limit(limit: Duration) -> Self {
        Self {
            max_settled_nodes: None,
            time_limit: Some(limit),
        }
    }
}

/// Directed road network with edge lengths in metres.
#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    adjacency: Vec<Vec<Edge>>,
    edge_count: usize,
}

impl RoadGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node at (lat, lng). Re-adding an id moves the existing node.
    pub fn add_node(&mut self, id: NodeId, (lat, lng): (f64, f64)) {
        if let Some(&idx) = self.index.get(&id) {
            self.nodes[idx].x = lng;
            self.nodes[idx].y = lat;
            return;
        }
        self.index.insert(id, self.nodes.len());
        self.nodes.push(Node { id, x: lng, y: lat });
        self.adjacency.push(Vec::new());
    }

    /// Adds a directed edge. Parallel edges are allowed; the shortest wins.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, length: f64) -> Result<(), GraphError> {
        if !length.is_finite() || length < 0.0 {
            return Err(GraphError::InvalidEdgeLength { from, to, length });
        }
        let from_idx = self.idx(from)?;
        let to_idx = self.idx(to)?;
        self.adjacency[from_idx].push(Edge { to: to_idx, length });
        self.edge_count += 1;
        Ok(())
    }

    /// Adds the edge in both directions.
    pub fn add_two_way(&mut self, a: NodeId, b: NodeId, length: f64) -> Result<(), GraphError> {
        self.add_edge(a, b, length)?;
        self.add_edge(b, a, length)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges, parallel ones included.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Check if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&idx| &self.nodes[idx])
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Shortest direct edge length from `from` to `to`, if any.
    pub fn edge_length(&self, from: NodeId, to: NodeId) -> Option<f64> {
        let from_idx = *self.index.get(&from)?;
        let to_idx = *self.index.get(&to)?;
        self.adjacency[from_idx]
            .iter()
            .filter(|edge| edge.to == to_idx)
            .map(|edge| edge.length)
            .min_by(f64::total_cmp)
    }

    /// Closest node to (lat, lng) by great-circle distance.
    ///
    /// Equidistant nodes resolve to the one inserted first.
    pub fn nearest_node(&self, coords: (f64, f64)) -> Result<NodeId, GraphError> {
        let mut best: Option<(f64, NodeId)> = None;
        for node in &self.nodes {
            let dist = haversine_m(coords, node.coords());
            match best {
                Some((best_dist, _)) if dist >= best_dist => {}
                _ => best = Some((dist, node.id)),
            }
        }
        best.map(|(_, id)| id).ok_or(GraphError::EmptyGraph)
    }

    /// Shortest route between the nodes nearest to two coordinates.
    ///
    /// Path and distance come out of the same search.
    pub fn shortest_route(
        &self,
        from: (f64, f64),
        to: (f64, f64),
        budget: &SearchBudget,
    ) -> Result<Route, GraphError> {
        let source = self.nearest_node(from)?;
        let target = self.nearest_node(to)?;
        self.route_between(source, target, budget)
    }

    /// Node sequence of the shortest route between two coordinates.
    pub fn shortest_path(&self, from: (f64, f64), to: (f64, f64)) -> Result<Vec<NodeId>, GraphError> {
        self.shortest_route(from, to, &SearchBudget::unbounded())
            .map(Route::into_nodes)
    }

    /// Length in metres of the shortest route between two coordinates.
    pub fn shortest_distance(&self, from: (f64, f64), to: (f64, f64)) -> Result<f64, GraphError> {
        self.shortest_route(from, to, &SearchBudget::unbounded())
            .map(|route| route.distance_m())
    }

    /// Shortest routes from one origin to many targets, one result per target.
    ///
    /// Searches run in parallel on a read-only view of the graph; results come
    /// back in target order so callers can tie-break on position.
    pub fn routes_from(
        &self,
        origin: (f64, f64),
        targets: &[(f64, f64)],
        budget: &SearchBudget,
    ) -> Vec<Result<Route, GraphError>> {
        let source = match self.nearest_node(origin) {
            Ok(source) => source,
            Err(err) => return targets.iter().map(|_| Err(err.clone())).collect(),
        };

        targets
            .par_iter()
            .map(|&target| {
                let target = self.nearest_node(target)?;
                self.route_between(source, target, budget)
            })
            .collect()
    }

    /// Dijkstra over edge lengths between two known nodes.
    pub fn route_between(
        &self,
        source: NodeId,
        target: NodeId,
        budget: &SearchBudget,
    ) -> Result<Route, GraphError> {
        let source_idx = self.idx(source)?;
        let target_idx = self.idx(target)?;

        let n = self.nodes.len();
        let mut dist = vec![f64::INFINITY; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        let mut heap = BinaryHeap::new();
        let started = Instant::now();
        let mut settled = 0usize;

        dist[source_idx] = 0.0;
        heap.push(Frontier {
            cost: 0.0,
            node: source_idx,
        });

        while let Some(Frontier { cost, node }) = heap.pop() {
            if cost > dist[node] {
                continue;
            }
            if node == target_idx {
                return Ok(Route::new(self.unwind(&prev, target_idx), cost));
            }

            settled += 1;
            if budget.max_settled_nodes.is_some_and(|max| settled > max)
                || budget.time_limit.is_some_and(|limit| started.elapsed() > limit)
            {
                return Err(GraphError::BudgetExhausted { settled });
            }

            for edge in &self.adjacency[node] {
                let next = cost + edge.length;
                if next < dist[edge.to] {
                    dist[edge.to] = next;
                    prev[edge.to] = Some(node);
                    heap.push(Frontier {
                        cost: next,
                        node: edge.to,
                    });
                }
            }
        }

        Err(GraphError::NoPath {
            from: source,
            to: target,
        })
    }

    /// Copy of the graph restricted to its largest weakly connected component.
    ///
    /// Node insertion order is preserved. On equal sizes the component that
    /// contains the earliest-inserted node wins.
    pub fn largest_component(&self) -> RoadGraph {
        let n = self.nodes.len();
        let mut undirected: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (from, edges) in self.adjacency.iter().enumerate() {
            for edge in edges {
                undirected[from].push(edge.to);
                undirected[edge.to].push(from);
            }
        }

        let mut component = vec![usize::MAX; n];
        let mut sizes: Vec<usize> = Vec::new();
        for start in 0..n {
            if component[start] != usize::MAX {
                continue;
            }
            let label = sizes.len();
            let mut size = 0;
            let mut queue = VecDeque::from([start]);
            component[start] = label;
            while let Some(node) = queue.pop_front() {
                size += 1;
                for &next in &undirected[node] {
                    if component[next] == usize::MAX {
                        component[next] = label;
                        queue.push_back(next);
                    }
                }
            }
            sizes.push(size);
        }

        let Some(keep) = sizes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(label, _)| label)
        else {
            return RoadGraph::new();
        };

        let mut kept = RoadGraph::new();
        for (idx, node) in self.nodes.iter().enumerate() {
            if component[idx] == keep {
                kept.add_node(node.id, node.coords());
            }
        }
        for (from, edges) in self.adjacency.iter().enumerate() {
            if component[from] != keep {
                continue;
            }
            for edge in edges {
                let from_new = kept.index[&self.nodes[from].id];
                let to_new = kept.index[&self.nodes[edge.to].id];
                kept.adjacency[from_new].push(Edge {
                    to: to_new,
                    length: edge.length,
                });
                kept.edge_count += 1;
            }
        }
        kept
    }

    fn idx(&self, id: NodeId) -> Result<usize, GraphError> {
        self.index.get(&id).copied().ok_or(GraphError::UnknownNode(id))
    }

    fn unwind(&self, prev: &[Option<usize>], target: usize) -> Vec<NodeId> {
        let mut path = vec![self.nodes[target].id];
        let mut cursor = target;
        while let Some(parent) = prev[cursor] {
            path.push(self.nodes[parent].id);
            cursor = parent;
        }
        path.reverse();
        path
    }
}

/// Min-heap entry; equal costs pop the lower node index first.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    cost: f64,
    node: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
