//! Host context and handshake types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Color scheme the host is rendering in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

/// How the host is presenting the embedded app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Inline,
    Fullscreen,
}

/// Rendered content dimensions, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

/// Font and style-variable assets the host injects into the app.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostStyles {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<CssAssets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CssAssets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fonts: Option<Value>,
}

/// Presentation state pushed by the host.
///
/// A transient snapshot: updates arrive as `host-context-changed`
/// notifications carrying only the fields that changed, and are merged into
/// the previous snapshot before being applied to the render surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<DisplayMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styles: Option<HostStyles>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_dimensions: Option<Dimensions>,
}

impl HostContext {
    /// Overlay the fields present in `update` onto this snapshot.
    pub fn merge(&mut self, update: HostContext) {
        if update.theme.is_some() {
            self.theme = update.theme;
        }
        if update.display_mode.is_some() {
            self.display_mode = update.display_mode;
        }
        if update.styles.is_some() {
            self.styles = update.styles;
        }
        if update.container_dimensions.is_some() {
            self.container_dimensions = update.container_dimensions;
        }
    }
}

/// App identity sent in the standalone `ui/initialize` handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

/// App capabilities advertised in the standalone handshake.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppCapabilities {
    pub available_display_modes: Vec<DisplayMode>,
}

/// Advisory lifecycle state of a channel.
///
/// `TornDown` does not gate message processing; teardown acknowledgment has
/// already been sent and cleanup has already run by the time it is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Uninitialized,
    Listening,
    TornDown,
}
