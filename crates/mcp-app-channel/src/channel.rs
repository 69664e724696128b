//! The app side of the host messaging contract.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::{oneshot, watch};
use tracing::{debug, warn};

use mcp_app_payload::normalize;

use crate::error::ChannelError;
use crate::jsonrpc::{
    methods, InboundMessage, JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    PROTOCOL_VERSION,
};
use crate::resize::{self, SizeGuard};
use crate::surface::AppSurface;
use crate::transport::Transport;
use crate::types::{
    AppCapabilities, AppInfo, ChannelState, Dimensions, DisplayMode, HostContext,
};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_SIZE_DEBOUNCE: Duration = Duration::from_millis(100);

/// Shown when a tool result arrives with no payload at all.
const EMPTY_RESULT_MESSAGE: &str = "No result data received";
/// Shown when a tool call is cancelled without a stated reason.
const DEFAULT_CANCEL_REASON: &str = "Unknown reason";

/// How the app entered the protocol session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelMode {
    /// An intermediary performed the handshake; messages may arrive at any
    /// time from the start.
    #[default]
    Proxy,
    /// The app performs its own `ui/initialize` handshake with the host.
    Standalone,
}

/// Channel tuning knobs.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub request_timeout: Duration,
    pub size_debounce: Duration,
    pub mode: ChannelMode,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            size_debounce: DEFAULT_SIZE_DEBOUNCE,
            mode: ChannelMode::Proxy,
        }
    }
}

impl ChannelConfig {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_size_debounce(mut self, debounce: Duration) -> Self {
        self.size_debounce = debounce;
        self
    }

    pub fn with_mode(mut self, mode: ChannelMode) -> Self {
        self.mode = mode;
        self
    }
}

type CleanupFn = Box<dyn FnOnce() -> anyhow::Result<()> + Send>;

/// Bridges an embedded app to its host over an untyped message transport,
/// enforcing the JSON-RPC 2.0 envelope convention.
///
/// One instance per embedded app session. Inbound messages are fed through
/// [`AppChannel::receive`] in delivery order; nothing in dispatch is allowed
/// to propagate a failure back to the transport boundary.
pub struct AppChannel {
    config: ChannelConfig,
    transport: Arc<dyn Transport>,
    surface: Arc<dyn AppSurface>,
    pending: Mutex<HashMap<u64, oneshot::Sender<Result<Value, ChannelError>>>>,
    next_id: AtomicU64,
    cleanups: Mutex<Vec<CleanupFn>>,
    host_context: Mutex<HostContext>,
    state: Mutex<ChannelState>,
}

impl AppChannel {
    pub fn new(transport: Arc<dyn Transport>, surface: Arc<dyn AppSurface>) -> Self {
        Self::with_config(transport, surface, ChannelConfig::default())
    }

    pub fn with_config(
        transport: Arc<dyn Transport>,
        surface: Arc<dyn AppSurface>,
        config: ChannelConfig,
    ) -> Self {
        let state = match config.mode {
            ChannelMode::Proxy => ChannelState::Listening,
            ChannelMode::Standalone => ChannelState::Uninitialized,
        };
        Self {
            config,
            transport,
            surface,
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            cleanups: Mutex::new(Vec::new()),
            host_context: Mutex::new(HostContext::default()),
            state: Mutex::new(state),
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn state(&self) -> ChannelState {
        *self.state.lock().unwrap()
    }

    /// The latest host context snapshot.
    pub fn host_context(&self) -> HostContext {
        self.host_context.lock().unwrap().clone()
    }

    /// Register a callback to run when the host requests teardown. Each
    /// callback runs at most once; failures are logged and never block the
    /// teardown acknowledgment.
    pub fn register_cleanup<F>(&self, cleanup: F)
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        self.cleanups.lock().unwrap().push(Box::new(cleanup));
    }

    /// Feed one raw transport message into the channel.
    ///
    /// Anything that is not a JSON-RPC 2.0 envelope is dropped silently.
    /// Replies are routed to the pending-request map; everything else is
    /// dispatched by method. Unrecognized methods fall back to treating
    /// their params as a renderable payload, because host implementations
    /// do not agree on a fixed method vocabulary.
    pub fn receive(&self, raw: Value) {
        let Some(message) = InboundMessage::classify(&raw) else {
            debug!("dropping malformed transport message");
            return;
        };

        match message {
            InboundMessage::Response { id, result, error } => {
                self.complete_request(&id, result, error);
            }
            InboundMessage::Request { id, method, params } => match method.as_str() {
                methods::RESOURCE_TEARDOWN => self.handle_teardown(id, params.as_ref()),
                _ => self.handle_unknown(&method, params.as_ref()),
            },
            InboundMessage::Notification { method, params } => match method.as_str() {
                methods::TOOL_RESULT => self.handle_tool_result(params.as_ref()),
                methods::HOST_CONTEXT_CHANGED => self.handle_host_context(params.as_ref()),
                methods::TOOL_CANCELLED => self.handle_tool_cancelled(params.as_ref()),
                methods::TOOL_INPUT => self.handle_tool_input(params.as_ref()),
                _ => self.handle_unknown(&method, params.as_ref()),
            },
        }
    }

    /// Issue a request to the host and await its correlated reply.
    ///
    /// Ids are assigned from a monotonic counter starting at 1 and never
    /// reused within a session. Exactly one of reply, host error, or
    /// timeout resolves each call; a reply arriving after the timeout is a
    /// logged no-op.
    pub async fn send_request(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, ChannelError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(id, tx);

        let request = JsonRpcRequest::new(method, id, params);
        if let Err(e) = self.post(&request) {
            self.pending.lock().unwrap().remove(&id);
            return Err(e);
        }

        match tokio::time::timeout(self.config.request_timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(ChannelError::Closed),
            Err(_) => {
                self.pending.lock().unwrap().remove(&id);
                Err(ChannelError::timeout(method))
            }
        }
    }

    /// Fire-and-forget notification to the host. The transport is
    /// best-effort; failures are logged, not signaled to the caller.
    pub fn send_notification(&self, method: &str, params: Option<Value>) {
        let notification = JsonRpcNotification::new(method, params);
        if let Err(e) = self.post(&notification) {
            warn!(method, error = %e, "failed to post notification");
        }
    }

    /// Standalone-mode handshake: announce the app and receive the initial
    /// host context, which is applied before returning.
    pub async fn initialize(
        &self,
        app_info: &AppInfo,
        capabilities: &AppCapabilities,
    ) -> Result<HostContext, ChannelError> {
        let params = json!({
            "appInfo": app_info,
            "appCapabilities": capabilities,
            "protocolVersion": PROTOCOL_VERSION,
        });
        let result = self.send_request(methods::INITIALIZE, Some(params)).await?;

        let update: HostContext =
            serde_json::from_value(result.get("hostContext").cloned().unwrap_or(Value::Null))
                .map_err(|e| ChannelError::protocol(format!("bad initialize reply: {e}")))?;

        let snapshot = {
            let mut context = self.host_context.lock().unwrap();
            context.merge(update);
            context.clone()
        };
        self.surface.apply_host_context(&snapshot);
        *self.state.lock().unwrap() = ChannelState::Listening;
        Ok(snapshot)
    }

    /// Ask the host to switch display mode; returns the granted mode.
    pub async fn request_display_mode(
        &self,
        mode: DisplayMode,
    ) -> Result<DisplayMode, ChannelError> {
        let result = self
            .send_request(methods::REQUEST_DISPLAY_MODE, Some(json!({ "mode": mode })))
            .await?;

        let granted: DisplayMode =
            serde_json::from_value(result.get("mode").cloned().unwrap_or(Value::Null))
                .map_err(|e| ChannelError::protocol(format!("bad display-mode reply: {e}")))?;

        self.host_context.lock().unwrap().display_mode = Some(granted);
        Ok(granted)
    }

    /// Notify the host that the rendered content's size changed.
    pub fn notify_size(&self, dimensions: Dimensions) {
        self.send_notification(
            methods::SIZE_CHANGED,
            Some(json!({ "width": dimensions.width, "height": dimensions.height })),
        );
    }

    /// Observe a stream of content dimensions and emit a size-changed
    /// notification each time they stabilize. The returned guard stops
    /// observation; it is idempotent and also wired into teardown cleanup.
    pub fn watch_size(self: &Arc<Self>, receiver: watch::Receiver<Dimensions>) -> SizeGuard {
        let guard = resize::spawn(Arc::clone(self), receiver);
        let registered = guard.clone();
        self.register_cleanup(move || {
            registered.stop();
            Ok(())
        });
        guard
    }

    fn post<T: Serialize>(&self, message: &T) -> Result<(), ChannelError> {
        let value =
            serde_json::to_value(message).map_err(|e| ChannelError::protocol(e.to_string()))?;
        self.transport.post(value)
    }

    fn complete_request(&self, id: &Value, result: Option<Value>, error: Option<JsonRpcError>) {
        let Some(sender) = id
            .as_u64()
            .and_then(|id| self.pending.lock().unwrap().remove(&id))
        else {
            // Host replied twice, or after our timeout already fired.
            warn!(id = %id, "reply with no matching pending request");
            return;
        };

        let outcome = match error {
            Some(error) => Err(error.into()),
            None => Ok(result.unwrap_or(Value::Null)),
        };
        if sender.send(outcome).is_err() {
            debug!(id = %id, "requester gone before reply was delivered");
        }
    }

    fn handle_tool_result(&self, params: Option<&Value>) {
        match result_payload(params) {
            Some(payload) => self.render_normalized(payload.clone(), Some(EMPTY_RESULT_MESSAGE)),
            None => self.surface.show_empty(EMPTY_RESULT_MESSAGE),
        }
    }

    fn handle_host_context(&self, params: Option<&Value>) {
        let update: HostContext = match params {
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(update) => update,
                Err(e) => {
                    debug!(error = %e, "dropping malformed host-context-changed params");
                    return;
                }
            },
            None => return,
        };

        let snapshot = {
            let mut context = self.host_context.lock().unwrap();
            context.merge(update);
            context.clone()
        };
        self.surface.apply_host_context(&snapshot);
    }

    fn handle_tool_cancelled(&self, params: Option<&Value>) {
        let reason = params
            .and_then(|p| p.get("reason"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_CANCEL_REASON);
        self.surface.show_error(reason);
    }

    fn handle_tool_input(&self, params: Option<&Value>) {
        self.surface
            .show_loading(params.and_then(|p| p.get("arguments")));
    }

    fn handle_unknown(&self, method: &str, params: Option<&Value>) {
        // Hosts diverge from the nominal vocabulary; if the params look
        // like a payload delivery, render them instead of failing hard.
        match result_payload(params) {
            Some(payload) => {
                debug!(method, "unrecognized method; treating params as payload");
                self.render_normalized(payload.clone(), None);
            }
            None => debug!(method, "ignoring unrecognized method"),
        }
    }

    fn render_normalized(&self, payload: Value, empty_message: Option<&str>) {
        let normalized = normalize(payload);
        if normalized.is_null() {
            if let Some(message) = empty_message {
                self.surface.show_empty(message);
            }
            return;
        }
        if let Err(e) = self.surface.render(normalized) {
            warn!(error = ?e, "render failed");
            self.surface.show_error(&e.to_string());
        }
    }

    fn handle_teardown(&self, id: Value, params: Option<&Value>) {
        let reason = params
            .and_then(|p| p.get("reason"))
            .and_then(Value::as_str)
            .unwrap_or("host request");
        debug!(reason, "tearing down");

        let cleanups: Vec<CleanupFn> = {
            let mut registered = self.cleanups.lock().unwrap();
            registered.drain(..).collect()
        };
        for cleanup in cleanups {
            if let Err(e) = cleanup() {
                warn!(error = ?e, "teardown cleanup failed");
            }
        }
        *self.state.lock().unwrap() = ChannelState::TornDown;

        // The acknowledgment is unconditional; a cleanup failure is never
        // allowed to drop it.
        let ack = JsonRpcResponse::success(id, json!({}));
        if let Err(e) = self.post(&ack) {
            warn!(error = %e, "failed to post teardown ack");
        }
    }
}

/// `params.structuredContent ?? params`: the payload field if it is present
/// and non-null, otherwise the params themselves.
fn result_payload(params: Option<&Value>) -> Option<&Value> {
    let params = params?;
    match params.get("structuredContent") {
        Some(content) if !content.is_null() => Some(content),
        _ => Some(params),
    }
}
