//! WebSocket server implementation.
//!
//! Handles client connections and routes messages to handlers.

use crate::handlers::{handle_clear, handle_info, handle_list, handle_route, handle_upload};
use crate::protocol::{
    Request, Response, RouteParams, TenantParams, UploadParams, JSONRPC_VERSION,
};
use crate::SharedRegistry;
use futures_util::{SinkExt, StreamExt};
use ruta_graph::GraphRegistry;
use ruta_ingest::DEFAULT_TENANT;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Default port for the JSON-RPC endpoint.
pub const DEFAULT_PORT: u16 = 7433;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub addr: SocketAddr,
    /// Tenant used by requests that don't name one.
    pub default_tenant: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            default_tenant: DEFAULT_TENANT.to_string(),
        }
    }
}

/// The Ruta WebSocket server.
pub struct RutaServer {
    config: Arc<ServerConfig>,
    registry: SharedRegistry,
}

impl RutaServer {
    /// Creates a new server over the given registry.
    pub fn new(registry: SharedRegistry, config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            registry,
        }
    }

    /// Returns a handle to the shared registry.
    pub fn registry(&self) -> SharedRegistry {
        Arc::clone(&self.registry)
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Binds the configured address and serves forever.
    pub async fn run(&self) -> Result<(), BoxError> {
        let listener = TcpListener::bind(self.config.addr).await?;
        info!("Ruta server listening on {}", self.config.addr);
        self.serve(listener).await
    }

    /// Accepts connections on an already bound listener.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), BoxError> {
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    debug!("New connection from {}", addr);
                    let registry = Arc::clone(&self.registry);
                    let config = Arc::clone(&self.config);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, registry, config).await {
                            error!("Connection error from {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Handles a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    registry: SharedRegistry,
    config: Arc<ServerConfig>,
) -> Result<(), BoxError> {
    let ws_stream = accept_async(stream).await?;
    info!("WebSocket connection established with {}", addr);

    let (mut write, mut read) = ws_stream.split();

    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                warn!("Message error from {}: {}", addr, e);
                break;
            }
        };

        if msg.is_close() {
            debug!("Client {} disconnected", addr);
            break;
        }

        if let Some(reply) = reply_to(msg, &registry, &config) {
            write.send(reply).await?;
        }
    }

    info!("Connection closed: {}", addr);
    Ok(())
}

/// Maps one inbound frame to the frame sent back, if any.
///
/// Text frames carry JSON-RPC requests. A binary frame is a raw
/// connection file for the default tenant and is answered like
/// `connections.upload`.
fn reply_to(msg: Message, registry: &GraphRegistry, config: &ServerConfig) -> Option<Message> {
    let response = match msg {
        Message::Text(text) => process_message(&text, registry, config),
        Message::Binary(bytes) => upload_frame(&bytes, registry, config),
        Message::Ping(data) => return Some(Message::Pong(data)),
        _ => return None,
    };

    match serde_json::to_string(&response) {
        Ok(json) => Some(Message::Text(json)),
        Err(e) => {
            error!("Could not encode response: {}", e);
            None
        }
    }
}

fn upload_frame(bytes: &[u8], registry: &GraphRegistry, config: &ServerConfig) -> Response {
    match std::str::from_utf8(bytes) {
        Ok(csv) => handle_upload(
            registry,
            &config.default_tenant,
            None,
            UploadParams {
                tenant: None,
                csv: csv.to_string(),
            },
        ),
        Err(_) => Response::invalid_params(None, "Connection upload must be UTF-8"),
    }
}

/// Decodes method params, treating absent params as an empty object.
fn decode_params<T: DeserializeOwned>(params: Value) -> Result<T, serde_json::Error> {
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params
    };
    serde_json::from_value(params)
}

/// Processes a JSON-RPC message and returns a response.
pub fn process_message(text: &str, registry: &GraphRegistry, config: &ServerConfig) -> Response {
    let request: Request = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(_) => return Response::parse_error(),
    };

    let id = request.id.clone();
    if request.jsonrpc != JSONRPC_VERSION {
        return Response::invalid_request(id);
    }

    let method = request.method.as_str();
    let tenant = config.default_tenant.as_str();

    debug!("Processing method: {}", method);

    match method {
        "graph.info" => handle_info(registry, id),

        "connections.upload" => match decode_params::<UploadParams>(request.params) {
            Ok(params) => handle_upload(registry, tenant, id, params),
            Err(e) => Response::invalid_params(id, e.to_string()),
        },

        "connections.list" => match decode_params::<TenantParams>(request.params) {
            Ok(params) => handle_list(registry, tenant, id, params),
            Err(e) => Response::invalid_params(id, e.to_string()),
        },

        "connections.clear" => match decode_params::<TenantParams>(request.params) {
            Ok(params) => handle_clear(registry, tenant, id, params),
            Err(e) => Response::invalid_params(id, e.to_string()),
        },

        "routes.shortest" => match decode_params::<RouteParams>(request.params) {
            Ok(params) => handle_route(registry, tenant, id, params),
            Err(e) => Response::invalid_params(id, e.to_string()),
        },

        _ => Response::method_not_found(id, method),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{
        INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR, ROUTE_NOT_FOUND,
        UPLOAD_REJECTED,
    };
    use serde_json::json;

    const FULL: &str = "origen,destino,tiempo\nA,B,10\nB,C,15\nC,D,20\nA,C,50\nB,D,60\nA,D,100";

    fn call(registry: &GraphRegistry, method: &str, params: Value) -> Response {
        let request = json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params});
        process_message(&request.to_string(), registry, &ServerConfig::default())
    }

    fn error_code(response: &Response) -> Option<i32> {
        response.error.as_ref().map(|e| e.code)
    }

    #[test]
    fn test_parse_error() {
        let registry = GraphRegistry::new();
        let response = process_message("{not json", &registry, &ServerConfig::default());
        assert_eq!(error_code(&response), Some(PARSE_ERROR));
    }

    #[test]
    fn test_wrong_version() {
        let registry = GraphRegistry::new();
        let text = r#"{"jsonrpc":"1.0","id":3,"method":"graph.info"}"#;
        let response = process_message(text, &registry, &ServerConfig::default());
        assert_eq!(error_code(&response), Some(INVALID_REQUEST));
        assert_eq!(response.id, Some(json!(3)));
    }

    #[test]
    fn test_unknown_method() {
        let registry = GraphRegistry::new();
        let response = call(&registry, "routes.longest", json!({}));
        assert_eq!(error_code(&response), Some(METHOD_NOT_FOUND));
    }

    #[test]
    fn test_upload_then_route() {
        let registry = GraphRegistry::new();

        let upload = call(&registry, "connections.upload", json!({"csv": FULL}));
        assert!(!upload.is_error());
        assert_eq!(upload.result.as_ref().unwrap()["edges"], json!(6));

        let route = call(&registry, "routes.shortest", json!({"from": "A", "to": "D"}));
        let result = route.result.unwrap();
        assert_eq!(result, json!({"route": ["A", "B", "C", "D"], "totalTime": 45}));
        assert_eq!(route.id, Some(json!(1)));
    }

    #[test]
    fn test_route_without_data() {
        let registry = GraphRegistry::new();
        let response = call(&registry, "routes.shortest", json!({"from": "A", "to": "B"}));
        let error = response.error.unwrap();
        assert_eq!(error.code, ROUTE_NOT_FOUND);
        assert_eq!(error.message, "No route found between A and B");
    }

    #[test]
    fn test_route_missing_params() {
        let registry = GraphRegistry::new();
        let response = call(&registry, "routes.shortest", json!({"from": "A"}));
        assert_eq!(error_code(&response), Some(INVALID_PARAMS));
    }

    #[test]
    fn test_rejected_upload() {
        let registry = GraphRegistry::new();
        let csv = "origen,destino,tiempo\nA,B,abc";
        let response = call(&registry, "connections.upload", json!({"csv": csv}));
        let error = response.error.unwrap();
        assert_eq!(error.code, UPLOAD_REJECTED);
        assert_eq!(error.message, "Invalid time at line 2");
    }

    #[test]
    fn test_list_and_clear_per_tenant() {
        let registry = GraphRegistry::new();
        call(&registry, "connections.upload", json!({"tenant": "t1", "csv": "B,A,1"}));
        call(&registry, "connections.upload", json!({"tenant": "t2", "csv": "X,Y,1"}));

        let list = call(&registry, "connections.list", json!({"tenant": "t1"}));
        let result = list.result.unwrap();
        assert_eq!(result["locations"], json!(["A", "B"]));
        assert_eq!(result["locationCount"], json!(2));
        assert_eq!(result["edgeCount"], json!(1));

        call(&registry, "connections.clear", json!({"tenant": "t1"}));
        let cleared = call(&registry, "connections.list", json!({"tenant": "t1"}));
        assert_eq!(cleared.result.unwrap()["locationCount"], json!(0));

        let other = call(&registry, "connections.list", json!({"tenant": "t2"}));
        assert_eq!(other.result.unwrap()["locationCount"], json!(2));
    }

    #[test]
    fn test_list_without_params_uses_default_tenant() {
        let registry = GraphRegistry::new();
        call(&registry, "connections.upload", json!({"csv": "A,B,1"}));

        let text = r#"{"jsonrpc":"2.0","id":7,"method":"connections.list"}"#;
        let response = process_message(text, &registry, &ServerConfig::default());
        let result = response.result.unwrap();
        assert_eq!(result["tenant"], json!("default"));
        assert_eq!(result["locationCount"], json!(2));
    }

    #[test]
    fn test_list_does_not_create_tenant() {
        let registry = GraphRegistry::new();
        call(&registry, "connections.list", json!({"tenant": "ghost"}));
        assert_eq!(registry.tenant_count(), 0);
    }

    #[test]
    fn test_info() {
        let registry = GraphRegistry::new();
        call(&registry, "connections.upload", json!({"tenant": "b", "csv": "A,B,1"}));
        call(&registry, "connections.upload", json!({"tenant": "a", "csv": "A,B,1"}));

        let result = call(&registry, "graph.info", Value::Null).result.unwrap();
        assert_eq!(result["tenants"], json!(["a", "b"]));
        assert_eq!(result["tenantCount"], json!(2));
    }

    fn reply_response(reply: Option<Message>) -> Response {
        let reply = reply.expect("a reply frame");
        serde_json::from_str(reply.to_text().unwrap()).unwrap()
    }

    #[test]
    fn test_binary_frame_uploads_to_default_tenant() {
        let registry = GraphRegistry::new();
        let frame = Message::Binary(b"origen,destino,tiempo\nA,B,10\nB,C,15".to_vec());

        let response = reply_response(reply_to(frame, &registry, &ServerConfig::default()));
        assert_eq!(response.result.unwrap()["edges"], json!(2));
        assert_eq!(registry.locations("default").len(), 3);
    }

    #[test]
    fn test_binary_frame_rejections() {
        let registry = GraphRegistry::new();
        let config = ServerConfig::default();

        let bad_utf8 = reply_response(reply_to(Message::Binary(vec![0xff, 0xfe]), &registry, &config));
        assert_eq!(error_code(&bad_utf8), Some(INVALID_PARAMS));

        let bad_csv = reply_response(reply_to(Message::Binary(b"A,B".to_vec()), &registry, &config));
        assert_eq!(error_code(&bad_csv), Some(UPLOAD_REJECTED));
        assert_eq!(registry.tenant_count(), 0);
    }

    #[test]
    fn test_control_frames() {
        let registry = GraphRegistry::new();
        let config = ServerConfig::default();

        let pong = reply_to(Message::Ping(vec![1, 2]), &registry, &config);
        assert_eq!(pong, Some(Message::Pong(vec![1, 2])));
        assert_eq!(reply_to(Message::Pong(vec![]), &registry, &config), None);
    }

    #[tokio::test]
    async fn test_websocket_round_trip() {
        use tokio_tungstenite::connect_async;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = RutaServer::new(Arc::new(GraphRegistry::new()), ServerConfig::default());
        let registry = server.registry();
        tokio::spawn(async move { server.serve(listener).await });

        let (mut socket, _) = connect_async(format!("ws://{}", addr)).await.unwrap();

        let upload = json!({
            "jsonrpc": "2.0", "id": 1, "method": "connections.upload",
            "params": {"csv": "A,B,10\nB,C,15\nA,C,50"}
        });
        socket.send(Message::Text(upload.to_string())).await.unwrap();
        let reply = socket.next().await.unwrap().unwrap();
        let response: Response = serde_json::from_str(reply.to_text().unwrap()).unwrap();
        assert!(!response.is_error());

        let query = json!({
            "jsonrpc": "2.0", "id": 2, "method": "routes.shortest",
            "params": {"from": "A", "to": "C"}
        });
        socket.send(Message::Text(query.to_string())).await.unwrap();
        let reply = socket.next().await.unwrap().unwrap();
        let response: Response = serde_json::from_str(reply.to_text().unwrap()).unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["route"], json!(["A", "B", "C"]));
        assert_eq!(result["totalTime"], json!(25));

        assert_eq!(registry.locations("default").len(), 3);
    }
}
