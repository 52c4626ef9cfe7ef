//! # sendqueue
//!
//! `sendqueue` is the outbound message path of a collaborative-editing
//! server. Every connected session owns a coalescing send queue: when a new
//! update is queued, older updates it makes obsolete (an earlier render of
//! the same tile, a previous cursor invalidation, a stale progress value)
//! are dropped, so a slow client catches up with the fewest, most current
//! messages.
//!
//! ## Core Modules
//!
//! - `queue`: the coalescing `SenderQueue`, its `Message` type and rules.
//! - `session`: sessions and the registry that relays messages between them.
//! - `transport`: the WebSocket server draining each session's queue.
//! - `config`: loading server configuration.
//! - `utils`: error types and logging setup.

pub mod config;
pub mod queue;
pub mod session;
pub mod transport;
pub mod utils;
