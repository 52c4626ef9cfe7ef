//! The `session` module tracks the connected client sessions.
//!
//! Each [`Session`] owns the coalescing [`SenderQueue`](crate::queue::SenderQueue)
//! its socket writer drains. The [`SessionRegistry`] holds all live sessions and
//! fans relayed messages out into their queues.

pub mod registry;
pub mod session;

pub use registry::SessionRegistry;
pub use session::{Session, SessionId};
