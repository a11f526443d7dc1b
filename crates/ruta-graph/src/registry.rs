//! Per-tenant graph registry.
//!
//! Each tenant owns exactly one `Graph` for the lifetime of the registry.
//! Graphs are created on first access and cleared in place, never
//! removed, so a `SharedGraph` handle stays valid after a reload.
//!
//! The tenant map is a `DashMap`, so first-access creation is safe across
//! threads: two callers resolving the same tenant concurrently always get
//! the same `Arc`. Mutation inside one tenant's graph goes through that
//! graph's own `RwLock`.

use crate::edge::{Distance, Edge};
use crate::graph::{Graph, GraphStats};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Handle to one tenant's graph.
pub type SharedGraph = Arc<RwLock<Graph>>;

/// A resolved route: ordered locations plus the summed edge weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub locations: Vec<String>,
    #[serde(rename = "totalWeight")]
    pub total_weight: Distance,
}

/// Maps tenant ids to their graphs.
#[derive(Debug, Default)]
pub struct GraphRegistry {
    graphs: DashMap<String, SharedGraph>,
}

impl GraphRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tenant's graph, creating an empty one on first access.
    ///
    /// Repeated calls for the same tenant return the same graph.
    pub fn graph_for(&self, tenant: &str) -> SharedGraph {
        if let Some(graph) = self.get(tenant) {
            return graph;
        }
        let graph = self
            .graphs
            .entry(tenant.to_string())
            .or_insert_with(|| {
                debug!(tenant, "creating graph");
                Arc::new(RwLock::new(Graph::new()))
            });
        Arc::clone(graph.value())
    }

    /// Returns the tenant's graph without creating it.
    pub fn get(&self, tenant: &str) -> Option<SharedGraph> {
        self.graphs.get(tenant).map(|graph| Arc::clone(graph.value()))
    }

    /// Resets the tenant's graph to empty. Unknown tenants are left alone.
    pub fn clear(&self, tenant: &str) {
        if let Some(graph) = self.get(tenant) {
            graph.write().clear();
            debug!(tenant, "cleared graph");
        }
    }

    /// Adds an edge to the tenant's graph, creating the graph if needed.
    pub fn add_edge(&self, tenant: &str, edge: Edge) {
        self.graph_for(tenant).write().add_edge(edge);
    }

    /// Clears the tenant's graph and loads `edges` under one write lock,
    /// so readers see either the old contents or the new ones.
    pub fn replace<I>(&self, tenant: &str, edges: I)
    where
        I: IntoIterator<Item = Edge>,
    {
        let graph = self.graph_for(tenant);
        let mut graph = graph.write();
        graph.clear();
        graph.extend(edges);
        debug!(tenant, edges = graph.edge_count(), "replaced graph");
    }

    /// Shortest path within the tenant's graph.
    ///
    /// Unknown tenants yield `None` and are not created.
    pub fn shortest_path(&self, tenant: &str, from: &str, to: &str) -> Option<Vec<String>> {
        self.get(tenant)?.read().shortest_path(from, to)
    }

    /// Sums the weight of the edge between each consecutive pair of
    /// locations in `path`.
    ///
    /// Returns 0 for unknown tenants and for paths shorter than two
    /// locations. A pair with no direct edge contributes 0 instead of
    /// failing; when parallel edges exist the first inserted one counts.
    pub fn route_weight<S: AsRef<str>>(&self, tenant: &str, path: &[S]) -> Distance {
        if path.len() < 2 {
            return 0;
        }
        let Some(graph) = self.get(tenant) else {
            return 0;
        };
        let graph = graph.read();
        path_weight(&graph, path)
    }

    /// Shortest path plus its weight, as served to route queries.
    ///
    /// Both are computed under one read lock, so a concurrent `replace`
    /// can't price the old path against the new edges.
    pub fn route(&self, tenant: &str, from: &str, to: &str) -> Option<Route> {
        let graph = self.get(tenant)?;
        let graph = graph.read();

        let locations = graph.shortest_path(from, to)?;
        let total_weight = path_weight(&graph, &locations);
        Some(Route {
            locations,
            total_weight,
        })
    }

    /// Location and edge counts for the tenant. Zero for unknown tenants.
    pub fn stats(&self, tenant: &str) -> GraphStats {
        self.get(tenant)
            .map(|graph| graph.read().stats())
            .unwrap_or_default()
    }

    /// Locations known to the tenant. Empty for unknown tenants.
    pub fn locations(&self, tenant: &str) -> HashSet<String> {
        self.get(tenant)
            .map(|graph| {
                graph
                    .read()
                    .locations()
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Known tenant ids, sorted.
    pub fn tenants(&self) -> Vec<String> {
        let mut tenants: Vec<String> = self.graphs.iter().map(|e| e.key().clone()).collect();
        tenants.sort();
        tenants
    }

    /// Returns the number of tenants that have been accessed.
    pub fn tenant_count(&self) -> usize {
        self.graphs.len()
    }
}

/// Sums the first-inserted edge weight of each consecutive hop; hops with
/// no direct edge add nothing.
fn path_weight<S: AsRef<str>>(graph: &Graph, path: &[S]) -> Distance {
    path.windows(2)
        .filter_map(|hop| graph.edge_between(hop[0].as_ref(), hop[1].as_ref()))
        .map(|edge| Distance::from(edge.weight))
        .sum()
}
