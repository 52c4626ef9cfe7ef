use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shutdown signal shared by any number of queues.
///
/// Once set it stays set. Reads never take a lock, so queues can consult it
/// before touching their own mutex.
#[derive(Debug, Clone, Default)]
pub struct TerminationFlag(Arc<AtomicBool>);

impl TerminationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide flag that queues use unless given their own.
    pub fn global() -> &'static TerminationFlag {
        static GLOBAL: OnceLock<TerminationFlag> = OnceLock::new();
        GLOBAL.get_or_init(TerminationFlag::new)
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
