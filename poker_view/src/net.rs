//! Networking layer shared by every page.
//!
//! One connection is opened per session and owned by the [`relay::Relay`];
//! pages only ever see frames that the relay forwards to them.

/// Connection lifecycle and the transport seam.
pub mod connection;

/// Protocol, transport and relay error types.
pub mod errors;

/// JSON frames exchanged with the server and between contexts.
pub mod messages;

/// The transport relay that owns the connection and the active page.
pub mod relay;
