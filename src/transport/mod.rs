//! The `transport` module is the network side of each session.
//!
//! It accepts WebSocket connections, gives each one a session, drains the
//! session's queue into the socket and relays frames the client sends to
//! the other sessions.

pub mod websocket;

pub use websocket::{serve, start_websocket_server};

#[cfg(test)]
mod tests;
