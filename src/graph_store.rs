//! On-disk road graphs.
//!
//! A graph file is JSON with a node list and a directed edge list. Edges may
//! omit `length`; it is then filled in with the great-circle distance between
//! the endpoints. Files are looked up as `<root>/<place-slug>-<mode>.json`.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{GraphError, GraphLoadError};
use crate::graph::{NodeId, RoadGraph};
use crate::haversine::haversine_m;
use crate::traits::{GraphSource, NetworkMode};

/// Serialized road graph: nodes plus directed edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphFile {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

/// `x` is longitude, `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
}

/// Directed edge; `length` in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
}

impl GraphFile {
    /// Build the in-memory graph, filling missing edge lengths.
    pub fn into_graph(self) -> Result<RoadGraph, GraphError> {
        let mut graph = RoadGraph::new();
        for node in &self.nodes {
            graph.add_node(node.id, (node.y, node.x));
        }
        for edge in &self.edges {
            let length = match edge.length {
                Some(length) => length,
                None => {
                    let from = graph.node(edge.from).ok_or(GraphError::UnknownNode(edge.from))?;
                    let to = graph.node(edge.to).ok_or(GraphError::UnknownNode(edge.to))?;
                    haversine_m(from.coords(), to.coords())
                }
            };
            graph.add_edge(edge.from, edge.to, length)?;
        }
        Ok(graph)
    }

    /// Read a graph file from disk.
    pub fn read(path: &Path) -> Result<Self, GraphLoadError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Turns "Nancy, France" into "nancy-france".
pub fn place_slug(place: &str) -> String {
    place
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// [`GraphSource`] reading graph files from a directory.
#[derive(Debug, Clone)]
pub struct GraphDirectory {
    root: PathBuf,
    /// Keep only the largest weakly connected component after loading.
    pub largest_component_only: bool,
}

impl GraphDirectory {
    /// Look up graph files under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            largest_component_only: true,
        }
    }

    /// File that holds the graph for `place` and `mode`.
    pub fn path_for(&self, place: &str, mode: NetworkMode) -> PathBuf {
        self.root
            .join(format!("{}-{}.json", place_slug(place), mode.as_str()))
    }
}

impl GraphSource for GraphDirectory {
    fn load_road_graph(&self, place: &str, mode: NetworkMode) -> Result<RoadGraph, GraphLoadError> {
        let path = self.path_for(place, mode);
        let graph = GraphFile::read(&path)?.into_graph()?;
        let graph = if self.largest_component_only {
            graph.largest_component()
        } else {
            graph
        };
        info!(
            path = %path.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "loaded road graph"
        );
        Ok(graph)
    }
}
