//! Bulk loading of connection files into a tenant's graph.
//!
//! The whole input is validated before the tenant's graph is touched. A
//! rejected upload leaves the previous graph in place; an accepted one
//! replaces it wholesale.

use crate::error::Result;
use crate::parser::parse_connections;
use ruta_graph::GraphRegistry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Tenant used when a caller doesn't name one.
pub const DEFAULT_TENANT: &str = "default";

/// Outcome of a successful load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    /// Tenant whose graph was replaced.
    pub tenant: String,
    /// Physical lines read, header and blank lines included.
    pub lines: usize,
    /// Edges inserted.
    pub edges: usize,
    /// Distinct locations in the graph after loading.
    pub locations: usize,
}

/// Validates `text` and replaces the tenant's graph with its connections.
pub fn load_connections(registry: &GraphRegistry, tenant: &str, text: &str) -> Result<LoadSummary> {
    let start = Instant::now();

    let edges = parse_connections(text).inspect_err(|e| {
        warn!(tenant, error = %e, "rejected connection upload");
    })?;
    let edge_count = edges.len();

    registry.replace(tenant, edges);

    let summary = LoadSummary {
        tenant: tenant.to_string(),
        lines: text.lines().count(),
        edges: edge_count,
        locations: registry.graph_for(tenant).read().location_count(),
    };

    info!(
        tenant,
        lines = summary.lines,
        edges = summary.edges,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "loaded connections"
    );

    Ok(summary)
}

/// Reads a connection file and loads it into the tenant's graph.
pub fn load_file(
    registry: &GraphRegistry,
    tenant: &str,
    path: impl AsRef<Path>,
) -> Result<LoadSummary> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).inspect_err(|e| {
        warn!(tenant, path = %path.display(), error = %e, "could not read connection file");
    })?;
    load_connections(registry, tenant, &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;

    const FULL: &str = "origen,destino,tiempo\nA,B,10\nB,C,15\nC,D,20\nA,C,50\nB,D,60\nA,D,100";

    #[test]
    fn test_load_connections() {
        let registry = GraphRegistry::new();
        let summary = load_connections(&registry, DEFAULT_TENANT, FULL).unwrap();

        assert_eq!(summary.tenant, "default");
        assert_eq!(summary.lines, 7);
        assert_eq!(summary.edges, 6);
        assert_eq!(summary.locations, 4);

        let route = registry.route(DEFAULT_TENANT, "A", "D").unwrap();
        assert_eq!(route.locations, vec!["A", "B", "C", "D"]);
        assert_eq!(route.total_weight, 45);
    }

    #[test]
    fn test_reload_replaces_previous_edges() {
        let registry = GraphRegistry::new();
        load_connections(&registry, "acme", "A,B,10").unwrap();
        load_connections(&registry, "acme", "X,Y,1").unwrap();

        let locations = registry.locations("acme");
        assert!(!locations.contains("A"));
        assert!(locations.contains("X"));
    }

    #[test]
    fn test_rejected_upload_keeps_previous_graph() {
        let registry = GraphRegistry::new();
        load_connections(&registry, "acme", "A,B,10").unwrap();

        let err = load_connections(&registry, "acme", "X,Y,1\nbroken").unwrap_err();
        assert!(matches!(err, IngestError::InvalidFormat { line: 2 }));

        let locations = registry.locations("acme");
        assert!(locations.contains("A"));
        assert!(!locations.contains("X"));
    }

    #[test]
    fn test_out_of_range_single_line_keeps_previous_graph() {
        let registry = GraphRegistry::new();
        load_connections(&registry, "acme", "A,B,10").unwrap();

        let err = load_connections(&registry, "acme", "A,B,99999999999").unwrap_err();
        assert!(matches!(err, IngestError::InvalidWeight { line: 1 }));
        assert_eq!(registry.locations("acme").len(), 2);
    }

    #[test]
    fn test_rejected_first_upload_creates_no_tenant() {
        let registry = GraphRegistry::new();
        assert!(load_connections(&registry, "acme", "").is_err());
        assert_eq!(registry.tenant_count(), 0);
    }

    #[test]
    fn test_load_is_per_tenant() {
        let registry = GraphRegistry::new();
        load_connections(&registry, "t1", "A,B,1").unwrap();
        load_connections(&registry, "t2", "C,D,1").unwrap();

        assert!(!registry.locations("t2").contains("A"));
        assert!(registry.locations("t1").contains("A"));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.csv");
        fs::write(&path, FULL).unwrap();

        let registry = GraphRegistry::new();
        let summary = load_file(&registry, "acme", &path).unwrap();
        assert_eq!(summary.edges, 6);
        assert_eq!(summary.lines, 7);
        assert_eq!(registry.shortest_path("acme", "A", "C").map(|p| p.len()), Some(3));
    }
}
