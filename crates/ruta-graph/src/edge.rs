//! Edge type for the route graph.
//!
//! A connection is a directed, weighted hop from one location to another.
//! Edges are plain values: two edges are the same edge only when source,
//! target and weight all match.

use serde::{Deserialize, Serialize};

/// Cost of traversing a single edge (travel time in the upstream data).
pub type Weight = u32;

/// Accumulated cost along a path.
pub type Distance = u64;

/// A directed connection between two locations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Location the connection leaves from.
    pub source: String,

    /// Location the connection arrives at.
    pub target: String,

    /// Non-negative traversal cost.
    pub weight: Weight,
}

impl Edge {
    /// Creates a new edge.
    pub fn new(source: impl Into<String>, target: impl Into<String>, weight: Weight) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
        }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {} ({})", self.source, self.target, self.weight)
    }
}
