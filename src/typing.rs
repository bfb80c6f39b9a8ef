//! The typing indicator.
//!
//! The indicator is raised by acquiring a [`TypingGuard`] and lowered when the
//! guard drops, so every exit path of a dispatch (success, failure, early
//! return, or a dropped future) releases it exactly once.  Overlapping
//! dispatches each hold their own guard; the indicator stays up until the
//! last one finishes.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared typing-indicator state.
#[derive(Debug, Clone, Default)]
pub struct TypingIndicator {
    in_flight: Arc<AtomicUsize>,
}

impl TypingIndicator {
    /// Creates a lowered indicator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the indicator until the returned guard drops.
    pub fn begin(&self) -> TypingGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        TypingGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    /// Returns true while at least one dispatch is in flight.
    pub fn is_typing(&self) -> bool {
        self.in_flight() > 0
    }

    /// Returns the number of dispatches currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Holds the typing indicator up for one dispatch.
#[derive(Debug)]
#[must_use = "the indicator is lowered as soon as the guard drops"]
pub struct TypingGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for TypingGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
