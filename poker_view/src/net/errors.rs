//! Error types for the protocol, transport and relay layers.

use thiserror::Error;

use super::connection::ConnectionState;

/// Errors raised while turning frames into typed messages and back.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame isn't JSON and isn't a legacy redirect either
    #[error("Malformed frame: {0}")]
    Malformed(String),

    /// The frame is JSON but doesn't have the expected shape
    #[error("Unexpected payload shape: {0}")]
    Shape(String),

    /// A command envelope named a command this client doesn't know
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    /// None of the known envelope fields were present
    #[error("Frame carries no recognized field")]
    Unrecognized,

    /// Failed to encode an outbound action
    #[error("Failed to encode action: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors reported by a [`Transport`](super::connection::Transport).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TransportError {
    #[error("Failed to connect: {0}")]
    Connect(String),

    #[error("Failed to send frame: {0}")]
    Send(String),

    #[error("Failed to receive frame: {0}")]
    Receive(String),

    #[error("Connection closed")]
    Closed,
}

/// Errors surfaced by the relay when forwarding frames.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Outbound frames are dropped unless the connection is open
    #[error("Transport unavailable ({state}), dropped outbound frame")]
    TransportUnavailable { state: ConnectionState },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
