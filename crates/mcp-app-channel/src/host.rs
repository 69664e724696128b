//! In-process host driver for development and tests.
//!
//! Stands in for a real embedding host over the in-memory transport:
//! synthesizes the notifications a host would send, answers app-issued
//! requests, and drives the teardown request/response exchange. Local
//! preview tooling uses this to exercise a template without a browser
//! host.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use serde_json::{json, Value};

use crate::channel::{AppChannel, ChannelConfig};
use crate::error::ChannelError;
use crate::jsonrpc::{methods, JsonRpcRequest, JSONRPC_VERSION};
use crate::surface::AppSurface;
use crate::transport::InMemoryTransport;
use crate::types::HostContext;

/// The host side of an in-memory app/host pair.
pub struct PreviewHost {
    channel: Arc<AppChannel>,
    outbound: Mutex<mpsc::UnboundedReceiver<Value>>,
    next_id: AtomicU64,
}

impl PreviewHost {
    /// Build a channel wired to this host and hand both ends back.
    pub fn new(surface: Arc<dyn AppSurface>) -> Self {
        Self::with_config(surface, ChannelConfig::default())
    }

    pub fn with_config(surface: Arc<dyn AppSurface>, config: ChannelConfig) -> Self {
        let (transport, outbound) = InMemoryTransport::pair();
        let channel = Arc::new(AppChannel::with_config(
            Arc::new(transport),
            surface,
            config,
        ));
        Self {
            channel,
            outbound: Mutex::new(outbound),
            next_id: AtomicU64::new(1),
        }
    }

    /// The app-side channel this host is driving.
    pub fn channel(&self) -> Arc<AppChannel> {
        Arc::clone(&self.channel)
    }

    /// Deliver an arbitrary raw value to the app, exactly as a transport
    /// would.
    pub fn send_raw(&self, message: Value) {
        self.channel.receive(message);
    }

    /// Deliver a tool result carrying `structuredContent`.
    pub fn send_tool_result(&self, structured_content: Value) {
        self.notify(
            methods::TOOL_RESULT,
            json!({ "structuredContent": structured_content }),
        );
    }

    /// Deliver a host context change.
    pub fn send_host_context(&self, context: &HostContext) {
        let params = serde_json::to_value(context).unwrap_or(Value::Null);
        self.notify(methods::HOST_CONTEXT_CHANGED, params);
    }

    /// Deliver a tool cancellation, with or without a reason.
    pub fn send_tool_cancelled(&self, reason: Option<&str>) {
        let params = match reason {
            Some(reason) => json!({ "reason": reason }),
            None => json!({}),
        };
        self.notify(methods::TOOL_CANCELLED, params);
    }

    /// Deliver the arguments of an in-flight tool call.
    pub fn send_tool_input(&self, arguments: Value) {
        self.notify(methods::TOOL_INPUT, json!({ "arguments": arguments }));
    }

    /// Request teardown and wait for the app's acknowledgment, skipping any
    /// interleaved notifications the app posts meanwhile.
    pub async fn teardown(&self) -> Result<Value, ChannelError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest::new(methods::RESOURCE_TEARDOWN, id, Some(json!({})));
        self.channel
            .receive(serde_json::to_value(&request).map_err(|e| ChannelError::protocol(e.to_string()))?);

        let mut outbound = self.outbound.lock().await;
        while let Some(message) = outbound.recv().await {
            let is_ack = message.get("id").and_then(Value::as_u64) == Some(id)
                && message.get("method").is_none();
            if is_ack {
                return Ok(message.get("result").cloned().unwrap_or(Value::Null));
            }
        }
        Err(ChannelError::Closed)
    }

    /// Answer an app-issued request by id.
    pub fn respond(&self, id: u64, result: Value) {
        self.channel.receive(json!({
            "jsonrpc": JSONRPC_VERSION,
            "id": id,
            "result": result,
        }));
    }

    /// Next envelope the app posted, waiting if none is queued yet.
    pub async fn next_outbound(&self) -> Option<Value> {
        self.outbound.lock().await.recv().await
    }

    /// Next envelope the app posted, if one is already queued.
    pub async fn try_next_outbound(&self) -> Option<Value> {
        self.outbound.lock().await.try_recv().ok()
    }

    fn notify(&self, method: &str, params: Value) {
        self.channel.receive(json!({
            "jsonrpc": JSONRPC_VERSION,
            "method": method,
            "params": params,
        }));
    }
}
