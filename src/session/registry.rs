//! Session registry
//!
//! Keeps every live session and relays messages between them.
//!
//! Locking notes:
//! - The registry map has its own mutex, separate from each session's queue
//!   lock. `broadcast` and `dump_state` snapshot the session list and release
//!   the map lock before touching any queue, so the two locks are never held
//!   together.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::queue::{Message, TerminationFlag};
use crate::session::session::{Session, SessionId};

#[derive(Debug)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, Arc<Session>>>,
    max_sessions: usize,
    termination: TerminationFlag,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_SESSIONS, TerminationFlag::global().clone())
    }
}

impl SessionRegistry {
    pub const DEFAULT_MAX_SESSIONS: usize = 1000;

    pub fn new(max_sessions: usize, termination: TerminationFlag) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_sessions,
            termination,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, Arc<Session>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Vec<Arc<Session>> {
        self.lock().values().cloned().collect()
    }

    pub fn termination(&self) -> &TerminationFlag {
        &self.termination
    }

    /// Registers a new session. Returns `None` when the registry is full or
    /// shutting down.
    pub fn open_session(&self) -> Option<Arc<Session>> {
        if self.termination.is_set() {
            return None;
        }

        let mut sessions = self.lock();
        if sessions.len() >= self.max_sessions {
            warn!("session limit of {} reached", self.max_sessions);
            return None;
        }

        let session = Arc::new(Session::new(self.termination.clone()));
        sessions.insert(session.id.clone(), Arc::clone(&session));
        info!("opened {}", session.id);
        Some(session)
    }

    pub fn close_session(&self, id: &SessionId) -> Option<Arc<Session>> {
        let removed = self.lock().remove(id);
        if let Some(session) = &removed {
            info!(
                "closed {} with {} undelivered messages",
                session.id,
                session.queue().size()
            );
        }
        removed
    }

    pub fn get(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Enqueues a copy of `message` for every session except `from`.
    /// Returns how many sessions it was queued for.
    pub fn broadcast(&self, from: &SessionId, message: &Message) -> usize {
        if self.termination.is_set() {
            return 0;
        }

        let mut delivered = 0;
        for session in self.snapshot() {
            if &session.id == from {
                continue;
            }
            let len = session.enqueue(message.clone());
            debug!("queued {} for {} ({len} pending)", message.id(), session.id);
            delivered += 1;
        }
        delivered
    }

    pub fn dump_state(&self, out: &mut impl Write) -> io::Result<()> {
        let mut sessions = self.snapshot();
        sessions.sort_by_key(|s| s.created_at);

        writeln!(out, "sessions: {}", sessions.len())?;
        for session in sessions {
            session.dump_state(out)?;
        }
        Ok(())
    }
}
