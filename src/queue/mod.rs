//! The `queue` module holds the per-session coalescing send queue.
//!
//! - `message`: the outbound [`Message`] and the command tokens the rules know.
//! - `tile`: the [`TileDesc`] parsed from `tile:` headers.
//! - `dedup`: the rules deciding which queued message a new one supersedes.
//! - `sender_queue`: the thread-safe [`SenderQueue`] itself.
//! - `termination`: the shutdown flag consulted before every operation.

mod dedup;
pub mod message;
pub mod sender_queue;
pub mod termination;
pub mod tile;

pub use message::Message;
pub use sender_queue::SenderQueue;
pub use termination::TerminationFlag;
pub use tile::TileDesc;
