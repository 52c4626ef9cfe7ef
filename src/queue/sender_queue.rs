use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::queue::dedup::Rule;
use crate::queue::message::Message;
use crate::queue::termination::TerminationFlag;

/// The queue of messages waiting to be written to one session's socket.
///
/// Producers call [`enqueue`](Self::enqueue) from any thread; the session's
/// writer drains it with [`dequeue`](Self::dequeue). Every enqueue first
/// removes the queued message the new one makes obsolete (an older render of
/// the same tile, the previous cursor invalidation, ...) and then appends the
/// new one at the tail. Messages that do not interact keep their FIFO order.
///
/// Once the termination flag is set the queue neither accepts nor yields
/// messages; whatever is still queued is abandoned.
#[derive(Debug)]
pub struct SenderQueue {
    queue: Mutex<VecDeque<Message>>,
    last_len: AtomicUsize,
    termination: TerminationFlag,
}

impl Default for SenderQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl SenderQueue {
    pub fn new() -> Self {
        Self::with_termination(TerminationFlag::global().clone())
    }

    pub fn with_termination(termination: TerminationFlag) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            last_len: AtomicUsize::new(0),
            termination,
        }
    }

    pub fn termination(&self) -> &TerminationFlag {
        &self.termination
    }

    // The deque is consistent between statements, so a panicking holder
    // leaves nothing half-done behind.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Message>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Coalesces and appends `message`, returning the queue length.
    ///
    /// During shutdown the message is dropped and the last length seen under
    /// the lock is returned.
    pub fn enqueue(&self, mut message: Message) -> usize {
        if self.termination.is_set() {
            trace!(id = message.id(), "termination flag set, dropping message");
            return self.last_len.load(Ordering::Relaxed);
        }

        let mut queue = self.lock();

        if let Some(pos) = Rule::for_message(&mut message).find_superseded(&queue) {
            if let Some(stale) = queue.remove(pos) {
                trace!(
                    removed = stale.id(),
                    by = message.id(),
                    "dropping superseded {}",
                    stale.command_token()
                );
            }
        }

        queue.push_back(message);
        let len = queue.len();
        self.last_len.store(len, Ordering::Relaxed);
        len
    }

    /// Pops the oldest message. Returns `None` when empty or shutting down;
    /// waiting is up to the caller.
    pub fn dequeue(&self) -> Option<Message> {
        if self.termination.is_set() {
            debug!("termination flag set, will not dequeue");
            return None;
        }

        let mut queue = self.lock();
        let message = queue.pop_front();
        self.last_len.store(queue.len(), Ordering::Relaxed);
        message
    }

    pub fn size(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Writes a report of the queued messages. Runs of identical text
    /// messages are folded into `<repeats N times>`; binary ones never are.
    pub fn dump_state(&self, out: &mut impl Write) -> io::Result<()> {
        let queue = self.lock();

        writeln!(out, "\t\tqueue items: {}", queue.len())?;

        let mut total_size = 0;
        let mut repeats = 0;
        let mut last_text: Option<String> = None;
        for item in queue.iter() {
            let abbreviated = item.abbreviated();
            total_size += item.len();

            if !item.is_binary() && last_text.as_deref() == Some(abbreviated.as_str()) {
                repeats += 1;
                continue;
            }
            if repeats > 0 {
                writeln!(out, "\t\t\t<repeats {repeats} times>")?;
                repeats = 0;
            }

            let kind = if item.is_binary() { "binary" } else { "text" };
            writeln!(out, "\t\t\ttype: {kind}: {} - {abbreviated}", item.id())?;
            last_text = (!item.is_binary()).then_some(abbreviated);
        }
        if repeats > 0 {
            writeln!(out, "\t\t\t<repeats {repeats} times>")?;
        }
        writeln!(out, "\t\tqueue size: {total_size} bytes")
    }
}
