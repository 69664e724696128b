//! Outbound message transport abstraction.

use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::ChannelError;

/// One-way, best-effort delivery of envelopes to the host.
///
/// The app side of an origin-unchecked message channel: posting succeeds as
/// long as the channel exists, and nothing is known about whether or when
/// the host processes the message.
pub trait Transport: Send + Sync {
    fn post(&self, message: Value) -> Result<(), ChannelError>;
}

/// In-process transport backed by an unbounded channel.
///
/// Used by embedding hosts and tests; the receiver half observes every
/// envelope the app posts, in order.
#[derive(Clone)]
pub struct InMemoryTransport {
    sender: mpsc::UnboundedSender<Value>,
}

impl InMemoryTransport {
    /// Create a connected transport/receiver pair.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<Value>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Transport for InMemoryTransport {
    fn post(&self, message: Value) -> Result<(), ChannelError> {
        self.sender
            .send(message)
            .map_err(|_| ChannelError::transport("transport receiver dropped"))
    }
}
