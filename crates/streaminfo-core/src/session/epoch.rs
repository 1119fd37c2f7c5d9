//! Session generation tracking.
//!
//! Scene signals and the background worker run on different threads; a
//! plain "running" boolean cannot tell a worker that its session ended
//! and a new one began while it slept. Each worker therefore captures an
//! [`Epoch`] at spawn and compares it against the shared counter before
//! every side effect.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing session generation counter.
#[derive(Debug, Clone, Default)]
pub struct EpochCounter {
    inner: Arc<AtomicU64>,
}

impl EpochCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, returning the epoch bound to it.
    pub fn advance(&self) -> Epoch {
        let value = self.inner.fetch_add(1, Ordering::SeqCst) + 1;
        Epoch {
            value,
            counter: Arc::clone(&self.inner),
        }
    }

    pub fn current(&self) -> u64 {
        self.inner.load(Ordering::SeqCst)
    }
}

/// An epoch captured by a background task at spawn time.
#[derive(Debug, Clone)]
pub struct Epoch {
    value: u64,
    counter: Arc<AtomicU64>,
}

impl Epoch {
    pub fn value(&self) -> u64 {
        self.value
    }

    /// True while no newer session has started.
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epochs_strictly_increase() {
        let counter = EpochCounter::new();
        let first = counter.advance();
        let second = counter.advance();
        let third = counter.advance();
        assert!(first.value() < second.value());
        assert!(second.value() < third.value());
        assert_eq!(counter.current(), third.value());
    }

    #[test]
    fn test_stale_epoch_detected() {
        let counter = EpochCounter::new();
        let old = counter.advance();
        assert!(old.is_current());

        let new = counter.advance();
        assert!(!old.is_current());
        assert!(new.is_current());
    }
}
