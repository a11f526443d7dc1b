//! Ruta Graph - Multi-tenant route graphs
//!
//! This crate holds each tenant's directed, weighted connection graph in
//! memory and answers single-pair shortest route queries over it.
//!
//! # Architecture
//!
//! - [`Graph`] stores one tenant's adjacency lists and runs Dijkstra.
//! - [`GraphRegistry`] maps tenant ids to graphs, creating them on first
//!   access, and sums edge weights along returned routes.
//!
//! Input validation (non-negative weights, non-empty names) belongs to the
//! ingestion layer; nothing here rejects an edge.
//!
//! # Example
//!
//! ```
//! use ruta_graph::{Edge, GraphRegistry};
//!
//! let registry = GraphRegistry::new();
//! registry.add_edge("acme", Edge::new("A", "B", 10));
//! registry.add_edge("acme", Edge::new("B", "C", 15));
//! registry.add_edge("acme", Edge::new("A", "C", 50));
//!
//! let route = registry.route("acme", "A", "C").unwrap();
//! assert_eq!(route.locations, vec!["A", "B", "C"]);
//! assert_eq!(route.total_weight, 25);
//! ```

mod edge;
mod graph;
mod path;
mod registry;

pub use edge::{Distance, Edge, Weight};
pub use graph::{Graph, GraphStats};
pub use registry::{GraphRegistry, Route, SharedGraph};
