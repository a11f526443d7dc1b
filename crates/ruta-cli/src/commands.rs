//! CLI command implementations.

use colored::Colorize;
use ruta_graph::{GraphRegistry, Route};
use ruta_ingest::{load_file, read_connections, DEFAULT_TENANT};
use ruta_server::{RutaServer, ServerConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Validate a connection file.
pub fn check(file: &Path) -> Result<()> {
    let edges = read_connections(file)?;
    println!(
        "{} {} is valid ({} connections)",
        "✓".green(),
        file.display(),
        edges.len().to_string().cyan()
    );
    Ok(())
}

/// List the locations in a connection file.
pub fn locations(file: &Path) -> Result<()> {
    let names = sorted_locations(file)?;

    if names.is_empty() {
        println!("No locations in {}", file.display());
        return Ok(());
    }

    println!("Found {} locations:\n", names.len());
    for name in names {
        println!("  {}", name.cyan());
    }
    Ok(())
}

fn sorted_locations(file: &Path) -> Result<Vec<String>> {
    let registry = GraphRegistry::new();
    load_file(&registry, DEFAULT_TENANT, file)?;

    let mut names: Vec<String> = registry.locations(DEFAULT_TENANT).into_iter().collect();
    names.sort();
    Ok(names)
}

/// Find the shortest route through a connection file.
pub fn route(file: &Path, from: &str, to: &str, json: bool) -> Result<()> {
    let found = find_route(file, from, to)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }

    println!(
        "{} {}",
        found.locations.join(" → ").cyan(),
        format!("({} total)", found.total_weight).dimmed()
    );
    Ok(())
}

fn find_route(file: &Path, from: &str, to: &str) -> Result<Route> {
    let registry = GraphRegistry::new();
    load_file(&registry, DEFAULT_TENANT, file)?;

    registry
        .route(DEFAULT_TENANT, from, to)
        .ok_or_else(|| format!("No route found between {} and {}", from, to).into())
}

/// Start the Ruta server.
pub async fn serve(port: u16, headless: bool, tenant: String, load: Option<&Path>) -> Result<()> {
    let bind_addr: IpAddr = if headless {
        Ipv4Addr::UNSPECIFIED.into()
    } else {
        Ipv4Addr::LOCALHOST.into()
    };

    if headless {
        println!("{}", "Starting Ruta server in headless mode...".cyan());
    } else {
        println!("{}", "Starting Ruta server...".cyan());
    }

    let registry = Arc::new(GraphRegistry::new());
    if let Some(file) = load {
        let summary = load_file(&registry, &tenant, file)?;
        println!(
            "{} Loaded {} connections ({} locations) for {}",
            "✓".green(),
            summary.edges,
            summary.locations,
            summary.tenant.cyan()
        );
    }

    let config = ServerConfig {
        addr: SocketAddr::new(bind_addr, port),
        default_tenant: tenant,
    };
    let server = RutaServer::new(registry, config);

    println!("{} Listening on ws://{}", "✓".green(), server.config().addr);
    if headless {
        println!("  Headless mode: accepting connections from any host");
    }
    println!("  Press {} to stop", "Ctrl+C".cyan());

    server.run().await.map_err(|e| e.to_string())?;

    Ok(())
}
