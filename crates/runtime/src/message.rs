//! Leased status line.
//!
//! The board holds at most one message. Publishing always overwrites, and a
//! message reads as empty once its lease has run out. The board has its own
//! lock and never calls out while holding it, so it can be used from inside
//! any other critical section without ordering concerns.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};

#[derive(Debug)]
struct Lease {
    text: String,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct MessageBoard {
    clock: Arc<dyn Clock>,
    slot: Mutex<Option<Lease>>,
}

impl MessageBoard {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            slot: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Lease>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the current message, expired or not.
    pub fn publish(&self, text: impl Into<String>, duration: Duration) {
        let text = text.into();
        tracing::debug!(%text, ?duration, "status message published");
        *self.slot() = Some(Lease {
            text,
            expires_at: self.clock.now() + duration,
        });
    }

    /// Publishes only when nothing is currently showing. Returns whether the
    /// message was published.
    pub fn publish_if_idle(&self, text: impl Into<String>, duration: Duration) -> bool {
        let now = self.clock.now();
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|lease| now < lease.expires_at) {
            return false;
        }
        *slot = Some(Lease {
            text: text.into(),
            expires_at: now + duration,
        });
        true
    }

    /// The active message, or an empty string once the lease has expired.
    pub fn current(&self) -> String {
        let now = self.clock.now();
        match self.slot().as_ref() {
            Some(lease) if now < lease.expires_at => lease.text.clone(),
            _ => String::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.current().is_empty()
    }
}

impl Default for MessageBoard {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}
