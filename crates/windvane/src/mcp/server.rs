// MCP stdio server.
//
// Reads newline-delimited JSON-RPC requests from stdin and writes one
// response per request to stdout; tracing output goes to stderr so the
// protocol stream stays clean. Every request runs independently against
// the shared resolver; there is no cross-request state beyond the
// read-only client configuration.

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use windvane_core::DeviceResolver;

use crate::mcp::tools;
use crate::mcp::types::{
    Capabilities, JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION, ResourceContents,
    ResourceDescriptor, ServerInfo, ToolCallParams,
};

/// JSON mime type used for every device resource.
const RESOURCE_MIME: &str = "application/json";

pub struct McpServer {
    resolver: DeviceResolver,
    info: ServerInfo,
}

impl McpServer {
    pub fn new(resolver: DeviceResolver) -> Self {
        Self {
            resolver,
            info: ServerInfo::default(),
        }
    }

    /// Serve until stdin closes.
    pub async fn run(&self) -> std::io::Result<()> {
        info!(name = %self.info.name, version = %self.info.version, "MCP server starting");

        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        let mut lines = stdin.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let Some(response) = self.handle_line(&line).await else {
                continue; // notification
            };

            let rendered = serde_json::to_string(&response).unwrap_or_else(|e| {
                error!("failed to serialize response: {e}");
                r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"Internal error"}}"#
                    .to_owned()
            });
            stdout.write_all(rendered.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }

        info!("MCP server shutting down");
        Ok(())
    }

    async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                warn!("unparseable request: {e}");
                return Some(JsonRpcResponse::parse_error());
            }
        };
        self.handle_request(request).await
    }

    /// Dispatch one request. Returns `None` for notifications.
    ///
    /// No failure path escapes this function unserialized: tool failures
    /// come back as `isError` results, everything else as a JSON-RPC
    /// error object.
    pub(crate) async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        debug!(method = %request.method, "handling request");

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": Capabilities::default(),
                    "serverInfo": self.info,
                }),
            ),
            // Notifications produce no response.
            "initialized" | "notifications/initialized" | "notifications/cancelled" => return None,
            "ping" => JsonRpcResponse::success(id, json!({})),
            "shutdown" => JsonRpcResponse::success(id, Value::Null),

            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": tools::definitions() })),
            "tools/call" => self.handle_tool_call(id, request.params).await,

            "resources/list" => self.handle_resources_list(id).await,
            "resources/read" => self.handle_resource_read(id, request.params).await,

            method => {
                warn!(method, "unknown method");
                JsonRpcResponse::method_not_found(id, method)
            }
        };
        Some(response)
    }

    async fn handle_tool_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let Some(params) = params else {
            return JsonRpcResponse::invalid_params(id, "missing params");
        };
        let call: ToolCallParams = match serde_json::from_value(params) {
            Ok(call) => call,
            Err(e) => return JsonRpcResponse::invalid_params(id, &e.to_string()),
        };

        let result = tools::execute(&self.resolver, &call.name, &call.arguments).await;
        match serde_json::to_value(&result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::failure(id, -32603, e.to_string(), None),
        }
    }

    async fn handle_resources_list(&self, id: Option<Value>) -> JsonRpcResponse {
        match self.resolver.list_resources().await {
            Ok(resources) => {
                let descriptors: Vec<ResourceDescriptor> = resources
                    .into_iter()
                    .map(|r| ResourceDescriptor {
                        name: r.name.clone().unwrap_or_else(|| r.uri.clone()),
                        description: r.station_type.as_deref().map(|station| {
                            format!("{station} weather station")
                        }),
                        uri: r.uri,
                        mime_type: RESOURCE_MIME,
                    })
                    .collect();
                JsonRpcResponse::success(id, json!({ "resources": descriptors }))
            }
            Err(err) => JsonRpcResponse::failure(
                id,
                -32603,
                err.message(),
                Some(tools::error_payload(&err)),
            ),
        }
    }

    async fn handle_resource_read(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let uri = params
            .as_ref()
            .and_then(|p| p.get("uri"))
            .and_then(Value::as_str)
            .unwrap_or("");
        let Some(address) = uri.strip_prefix("device/") else {
            return JsonRpcResponse::invalid_params(id, "uri must look like device/{address}");
        };

        match self.resolver.get_by_address(address).await {
            Ok(detail) => {
                let contents = ResourceContents {
                    uri: uri.to_owned(),
                    mime_type: RESOURCE_MIME,
                    text: serde_json::to_string_pretty(&detail).unwrap_or_else(|_| detail.to_string()),
                };
                JsonRpcResponse::success(id, json!({ "contents": [contents] }))
            }
            Err(err) => JsonRpcResponse::failure(
                id,
                -32603,
                err.message(),
                Some(tools::error_payload(&err)),
            ),
        }
    }
}
