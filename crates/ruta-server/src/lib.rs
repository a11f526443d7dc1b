//! Ruta Server - WebSocket server for route queries
//!
//! This crate exposes a `GraphRegistry` over JSON-RPC 2.0 on WebSocket.
//! Clients upload connection files per tenant and ask for shortest
//! routes between locations.
//!
//! The server supports:
//! - Multiple concurrent connections sharing one registry
//! - Per-tenant uploads, listing and clearing
//! - Shortest route queries with total travel time

use ruta_graph::GraphRegistry;
use std::sync::Arc;

/// Registry shared across connections.
pub type SharedRegistry = Arc<GraphRegistry>;

mod handlers;
mod protocol;
mod server;

pub use protocol::{Request, Response, RpcError};
pub use server::{process_message, RutaServer, ServerConfig, DEFAULT_PORT};
