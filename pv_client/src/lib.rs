//! Internal modules for the console poker client.
//!
//! This library provides configuration loading and the WebSocket transport
//! used by the pv_client binary.

pub mod config;
pub mod websocket_client;
