//! Request handlers for protocol methods.
//!
//! Each handler implements one method. Handlers are synchronous: the
//! registry never blocks on I/O, so there is nothing to await.

use crate::protocol::{
    Response, RouteParams, TenantParams, UploadParams, ROUTE_NOT_FOUND, UPLOAD_REJECTED,
};
use ruta_graph::{GraphRegistry, GraphStats};
use ruta_ingest::load_connections;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Handles the graph.info method.
pub fn handle_info(registry: &GraphRegistry, id: Option<Value>) -> Response {
    #[derive(Serialize)]
    struct InfoResult {
        tenants: Vec<String>,
        #[serde(rename = "tenantCount")]
        tenant_count: usize,
        version: &'static str,
    }

    Response::success(
        id,
        InfoResult {
            tenant_count: registry.tenant_count(),
            tenants: registry.tenants(),
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

/// Handles the connections.upload method.
pub fn handle_upload(
    registry: &GraphRegistry,
    default_tenant: &str,
    id: Option<Value>,
    params: UploadParams,
) -> Response {
    let tenant = params.tenant.as_deref().unwrap_or(default_tenant);
    debug!("Upload for tenant {} ({} bytes)", tenant, params.csv.len());

    match load_connections(registry, tenant, &params.csv) {
        Ok(summary) => Response::success(id, summary),
        Err(e) => Response::error(id, UPLOAD_REJECTED, e.to_string()),
    }
}

/// Handles the connections.list method.
pub fn handle_list(
    registry: &GraphRegistry,
    default_tenant: &str,
    id: Option<Value>,
    params: TenantParams,
) -> Response {
    let tenant = params.tenant.as_deref().unwrap_or(default_tenant);

    #[derive(Serialize)]
    struct ListResult<'a> {
        tenant: &'a str,
        #[serde(flatten)]
        stats: GraphStats,
        locations: Vec<String>,
    }

    let mut locations: Vec<String> = registry.locations(tenant).into_iter().collect();
    locations.sort();

    Response::success(
        id,
        ListResult {
            tenant,
            stats: registry.stats(tenant),
            locations,
        },
    )
}

/// Handles the connections.clear method.
pub fn handle_clear(
    registry: &GraphRegistry,
    default_tenant: &str,
    id: Option<Value>,
    params: TenantParams,
) -> Response {
    let tenant = params.tenant.as_deref().unwrap_or(default_tenant);
    registry.clear(tenant);

    Response::success(
        id,
        serde_json::json!({
            "tenant": tenant,
            "cleared": true
        }),
    )
}

/// Handles the routes.shortest method.
pub fn handle_route(
    registry: &GraphRegistry,
    default_tenant: &str,
    id: Option<Value>,
    params: RouteParams,
) -> Response {
    let tenant = params.tenant.as_deref().unwrap_or(default_tenant);

    debug!("Route query for {}: {} -> {}", tenant, params.from, params.to);

    match registry.route(tenant, &params.from, &params.to) {
        Some(route) => Response::success(
            id,
            serde_json::json!({
                "route": route.locations,
                "totalTime": route.total_weight
            }),
        ),
        None => Response::error(
            id,
            ROUTE_NOT_FOUND,
            format!("No route found between {} and {}", params.from, params.to),
        ),
    }
}
