use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::queue::{Message, SenderQueue, TerminationFlag};

pub type SessionId = String;

/// One connected client and the queue of messages waiting for it.
#[derive(Debug)]
pub struct Session {
    /// Unique identifier, `session-<uuid>`.
    pub id: SessionId,

    pub created_at: DateTime<Utc>,

    queue: SenderQueue,
    next_seq: AtomicU64,
}

impl Session {
    pub fn new(termination: TerminationFlag) -> Self {
        Self {
            id: format!("session-{}", Uuid::new_v4()),
            created_at: Utc::now(),
            queue: SenderQueue::with_termination(termination),
            next_seq: AtomicU64::new(1),
        }
    }

    pub fn queue(&self) -> &SenderQueue {
        &self.queue
    }

    /// Diagnostic id for the next message produced on behalf of this session.
    pub fn next_message_id(&self) -> String {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        format!("{}-{seq}", self.id)
    }

    pub fn enqueue(&self, message: Message) -> usize {
        self.queue.enqueue(message)
    }

    pub fn dump_state(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "\t{} (since {})", self.id, self.created_at.to_rfc3339())?;
        self.queue.dump_state(out)
    }
}
