//! JSON-RPC 2.0 envelope types and the embedded-UI method vocabulary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol revision sent during the standalone `ui/initialize` handshake.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 success/error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 notification envelope (no id, no reply expected).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, id: impl Into<Value>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

/// Method name constants for the host/app wire vocabulary.
pub mod methods {
    /// host→app: a tool call finished; params carry the result payload.
    pub const TOOL_RESULT: &str = "ui/notifications/tool-result";
    /// host→app: theme, display mode, or style variables changed.
    pub const HOST_CONTEXT_CHANGED: &str = "ui/notifications/host-context-changed";
    /// host→app: the in-flight tool call was cancelled.
    pub const TOOL_CANCELLED: &str = "ui/notifications/tool-cancelled";
    /// host→app: the arguments a tool call was invoked with.
    pub const TOOL_INPUT: &str = "ui/notifications/tool-input";
    /// host→app request: release resources before removal. Must be acked.
    pub const RESOURCE_TEARDOWN: &str = "ui/resource-teardown";
    /// app→host request: ask to switch display mode.
    pub const REQUEST_DISPLAY_MODE: &str = "ui/request-display-mode";
    /// app→host request: standalone-mode handshake.
    pub const INITIALIZE: &str = "ui/initialize";
    /// app→host: the rendered content's size stabilized at new dimensions.
    pub const SIZE_CHANGED: &str = "ui/notifications/size-changed";
}

/// A transport message classified by its envelope shape.
///
/// Messages carrying an `id` but no `method` are replies to requests this
/// side issued; they are routed to the pending-request map, never to the
/// method dispatcher.
#[derive(Debug, Clone)]
pub enum InboundMessage {
    Request {
        id: Value,
        method: String,
        params: Option<Value>,
    },
    Notification {
        method: String,
        params: Option<Value>,
    },
    Response {
        id: Value,
        result: Option<Value>,
        error: Option<JsonRpcError>,
    },
}

impl InboundMessage {
    /// Classify a raw transport value, or `None` if it is not a JSON-RPC
    /// 2.0 envelope at all (wrong type, missing/wrong `jsonrpc`, or neither
    /// `id` nor `method` present).
    pub fn classify(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;
        if obj.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
            return None;
        }

        let id = obj.get("id").filter(|v| !v.is_null()).cloned();
        let method = obj.get("method").and_then(Value::as_str);
        let params = obj.get("params").cloned();

        match (id, method) {
            (Some(id), Some(method)) => Some(Self::Request {
                id,
                method: method.to_string(),
                params,
            }),
            (None, Some(method)) => Some(Self::Notification {
                method: method.to_string(),
                params,
            }),
            (Some(id), None) => Some(Self::Response {
                id,
                result: obj.get("result").cloned(),
                error: obj
                    .get("error")
                    .and_then(|e| serde_json::from_value(e.clone()).ok()),
            }),
            (None, None) => None,
        }
    }
}
