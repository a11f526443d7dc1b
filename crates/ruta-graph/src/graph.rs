//! Core graph data structure.
//!
//! A `Graph` holds one tenant's connections as adjacency lists keyed by
//! source location. The set of locations is never stored on its own: it
//! is recomputed from the adjacency lists, so it can't drift from the
//! edges that define it.

use crate::edge::Edge;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A directed, weighted route graph.
///
/// Parallel edges between the same pair of locations are kept as separate
/// entries. Lookups by pair (`edge_between`) see the first one inserted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    /// Outgoing edges per source location, in insertion order.
    adjacency: HashMap<String, Vec<Edge>>,
}

impl Graph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an edge to its source location's adjacency list.
    ///
    /// No deduplication is done: inserting the same pair twice leaves two
    /// edges behind.
    pub fn add_edge(&mut self, edge: Edge) {
        self.adjacency
            .entry(edge.source.clone())
            .or_default()
            .push(edge);
    }

    /// Outgoing edges of `location` in insertion order. Empty for unknown
    /// locations.
    pub fn edges_from(&self, location: &str) -> &[Edge] {
        self.adjacency
            .get(location)
            .map(|edges| edges.as_slice())
            .unwrap_or(&[])
    }

    /// Every location that appears as the source or target of an edge.
    pub fn locations(&self) -> HashSet<&str> {
        let mut locations = HashSet::new();
        for (source, edges) in &self.adjacency {
            locations.insert(source.as_str());
            for edge in edges {
                locations.insert(edge.target.as_str());
            }
        }
        locations
    }

    /// First-inserted edge from `from` to `to`, if any.
    pub fn edge_between(&self, from: &str, to: &str) -> Option<&Edge> {
        self.edges_from(from).iter().find(|edge| edge.target == to)
    }

    /// Removes every edge, and with them every location.
    pub fn clear(&mut self) {
        self.adjacency.clear();
    }

    /// Returns the number of distinct locations.
    pub fn location_count(&self) -> usize {
        self.locations().len()
    }

    /// Returns the number of edges, parallel edges included.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Returns true if no edges are stored.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            location_count: self.location_count(),
            edge_count: self.edge_count(),
        }
    }
}

impl Extend<Edge> for Graph {
    fn extend<I: IntoIterator<Item = Edge>>(&mut self, edges: I) {
        for edge in edges {
            self.add_edge(edge);
        }
    }
}

impl FromIterator<Edge> for Graph {
    fn from_iter<I: IntoIterator<Item = Edge>>(edges: I) -> Self {
        let mut graph = Graph::new();
        graph.extend(edges);
        graph
    }
}

/// Graph statistics for listing endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    #[serde(rename = "locationCount")]
    pub location_count: usize,
    #[serde(rename = "edgeCount")]
    pub edge_count: usize,
}
