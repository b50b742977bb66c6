//! Error types for the host-side link.

use groundlink_core::params::EchoFailure;
use groundlink_core::protocol::{FrameError, MessageError};

/// Failures of the underlying byte transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport disconnected")]
    Disconnected,
}

/// Errors from sending on a link.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Frame error: {0}")]
    Frame(FrameError),

    #[error("Message error: {0}")]
    Message(MessageError),

    #[error("Link closed")]
    Closed,
}

impl From<FrameError> for LinkError {
    fn from(err: FrameError) -> Self {
        LinkError::Frame(err)
    }
}

impl From<MessageError> for LinkError {
    fn from(err: MessageError) -> Self {
        LinkError::Message(err)
    }
}

/// Outcome of a parameter write that could not be confirmed.
#[derive(Debug, thiserror::Error)]
pub enum ParamWriteError {
    #[error("Parameter {name} not confirmed after {attempts} attempts: {last}")]
    Exhausted {
        name: String,
        attempts: u32,
        last: EchoFailure,
    },

    #[error("Invalid parameter name: {0:?}")]
    InvalidName(String),

    #[error("Link closed while waiting for echo")]
    LinkClosed,

    #[error("Send failed: {0}")]
    Send(#[from] LinkError),
}

/// Errors from flight commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown flight mode: {0}")]
    UnknownMode(String),

    #[error("Send failed: {0}")]
    Send(#[from] LinkError),
}

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
