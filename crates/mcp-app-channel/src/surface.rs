//! The render-collaborator boundary.

use serde_json::Value;

use crate::types::HostContext;

/// What a template plugs into the channel: the presentation side effects.
///
/// One implementation per template. The channel guarantees `render` is only
/// called with already-normalized payloads, and that a failing `render`
/// never takes down message dispatch: the failure is logged and converted
/// into a `show_error` call instead.
pub trait AppSurface: Send + Sync {
    /// Present a normalized payload. Must not panic; recoverable failures
    /// are reported through the returned error.
    fn render(&self, payload: Value) -> anyhow::Result<()>;

    /// Present an explicit empty state with a human-readable message.
    fn show_empty(&self, message: &str);

    /// Present a contained error state with a human-readable message.
    fn show_error(&self, message: &str);

    /// React to a host context change (theme classes, style variables,
    /// display-mode layout).
    fn apply_host_context(&self, context: &HostContext);

    /// Optionally prime a loading state from the tool-call arguments.
    fn show_loading(&self, _arguments: Option<&Value>) {}
}
