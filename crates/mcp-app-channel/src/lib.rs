//! Host-communication message channel for embedded MCP Apps.
//!
//! Owns the embedded app's side of the host messaging contract: JSON-RPC
//! 2.0 envelopes over an untyped bidirectional message transport. One
//! [`AppChannel`] per app session receives host notifications and requests,
//! correlates replies to app-issued requests, and pushes presentation side
//! effects through the template's [`AppSurface`].
//!
//! Templates plug in a surface. Payload normalization, teardown
//! acknowledgment, request timeouts, and size-change notifications are
//! shared here instead of reimplemented per template.

pub mod channel;
pub mod error;
pub mod host;
pub mod jsonrpc;
pub mod resize;
pub mod surface;
pub mod transport;
pub mod types;

pub use channel::{AppChannel, ChannelConfig, ChannelMode};
pub use error::ChannelError;
pub use host::PreviewHost;
pub use resize::SizeGuard;
pub use surface::AppSurface;
pub use transport::{InMemoryTransport, Transport};
pub use types::{
    AppCapabilities, AppInfo, ChannelState, Dimensions, DisplayMode, HostContext, Theme,
};
