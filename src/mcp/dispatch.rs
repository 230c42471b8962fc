//! Per-session MCP protocol server.
//!
//! Decodes JSON-RPC requests delivered by a transport and dispatches them to
//! the tool registry or the widget resource of the shared [`ServerProfile`].

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::profile::ServerProfile;

use super::handlers::ToolCallError;
use super::types::{
    JsonRpcRequest, JsonRpcResponse, ReadResourceParams, ToolCallParams, ToolsListResult,
    INVALID_REQUEST, JSONRPC_VERSION,
};

/// Newest first; the first entry is offered when the client asks for
/// something we do not speak.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// Protocol server bound to one session
#[derive(Clone)]
pub struct McpServer {
    profile: Arc<ServerProfile>,
    session_id: String,
    initialized: Arc<AtomicBool>,
}

impl McpServer {
    pub fn new(profile: Arc<ServerProfile>, session_id: impl Into<String>) -> Self {
        Self {
            profile,
            session_id: session_id.into(),
            initialized: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True once the client sent `notifications/initialized`
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Handle one message. Notifications never produce a response.
    pub fn handle(&self, req: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if req.is_notification() {
            self.handle_notification(&req);
            return None;
        }
        let id = req.id.clone().unwrap_or(Value::Null);

        if req.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                "Invalid JSON-RPC version",
            ));
        }

        debug!(session_id = %self.session_id, method = %req.method, "MCP request");

        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(id, req.params),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => to_response(
                id,
                &ToolsListResult {
                    tools: self.profile.tools().definitions(),
                },
            ),
            "tools/call" => self.handle_tool_call(id, req.params),
            "resources/list" if self.profile.has_resources() => {
                to_response(id, &json!({ "resources": self.profile.resources() }))
            }
            "resources/templates/list" if self.profile.has_resources() => to_response(
                id,
                &json!({ "resourceTemplates": self.profile.resource_templates() }),
            ),
            "resources/read" if self.profile.has_resources() => {
                self.handle_read_resource(id, req.params)
            }
            _ => {
                warn!(session_id = %self.session_id, "Unknown MCP method: {}", req.method);
                JsonRpcResponse::method_not_found(id, &req.method)
            }
        };

        Some(response)
    }

    fn handle_notification(&self, req: &JsonRpcRequest) {
        match req.method.as_str() {
            "notifications/initialized" => {
                self.initialized.store(true, Ordering::SeqCst);
                info!(session_id = %self.session_id, "Client initialized");
            }
            other => debug!(session_id = %self.session_id, "Ignoring notification {}", other),
        }
    }

    fn handle_initialize(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let requested = params
            .as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(|v| v.as_str());
        let protocol_version = requested
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
            .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);

        let mut capabilities = json!({ "tools": { "listChanged": false } });
        if self.profile.has_resources() {
            capabilities["resources"] = json!({ "listChanged": false });
        }

        info!(
            session_id = %self.session_id,
            "MCP initialize (protocol {})", protocol_version
        );

        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": protocol_version,
                "capabilities": capabilities,
                "serverInfo": {
                    "name": self.profile.name(),
                    "version": self.profile.version()
                }
            }),
        )
    }

    fn handle_tool_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(tp) => tp,
                Err(e) => {
                    return JsonRpcResponse::invalid_params(id, format!("Invalid params: {}", e));
                }
            },
            None => {
                return JsonRpcResponse::invalid_params(id, "Missing params");
            }
        };

        info!(session_id = %self.session_id, "MCP tool call: {}", tool_params.name);

        match self
            .profile
            .tools()
            .call(&tool_params.name, tool_params.arguments)
        {
            Ok(result) => to_response(id, &result),
            Err(e) => {
                let message = e.to_string();
                match e {
                    ToolCallError::InvalidArguments { errors, .. } => {
                        JsonRpcResponse::invalid_params(id, message)
                            .with_error_data(json!({ "errors": errors }))
                    }
                    ToolCallError::UnknownTool(_) | ToolCallError::Encode(_) => {
                        warn!(session_id = %self.session_id, "{}", message);
                        JsonRpcResponse::internal_error(id, message)
                    }
                }
            }
        }
    }

    fn handle_read_resource(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let read: ReadResourceParams = match params.map(serde_json::from_value) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::invalid_params(id, format!("Invalid params: {}", e));
            }
            None => return JsonRpcResponse::invalid_params(id, "Missing params"),
        };

        match self.profile.read_resource(&read.uri) {
            Some(contents) => to_response(id, &json!({ "contents": [contents] })),
            None => JsonRpcResponse::invalid_params(id, format!("Resource not found: {}", read.uri)),
        }
    }
}

fn to_response<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::internal_error(id, format!("Failed to encode result: {}", e)),
    }
}
