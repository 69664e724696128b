//! Channel error types.

use crate::jsonrpc::JsonRpcError;

/// Errors surfaced by channel operations.
///
/// Only request/response operations report errors to callers; inbound
/// dispatch and fire-and-forget notifications degrade to logged, contained
/// states instead (see the channel module).
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChannelError {
    #[error("Request timed out: {method}")]
    Timeout { method: String },

    #[error("Channel closed before a reply arrived")]
    Closed,

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Protocol error: {message}")]
    Protocol { message: String },

    #[error("Host error {code}: {message}")]
    Host { code: i32, message: String },
}

impl ChannelError {
    pub fn timeout(method: impl Into<String>) -> Self {
        Self::Timeout {
            method: method.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

impl From<JsonRpcError> for ChannelError {
    fn from(error: JsonRpcError) -> Self {
        Self::Host {
            code: error.code,
            message: error.message,
        }
    }
}
