//! Cooperative cancellation with interruptible waits.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// A one-way cancellation token.
///
/// Unlike `thread::sleep`, waits on this token wake immediately when the
/// token is cancelled, so a sleeping loop notices cancellation within one
/// interval at most.
pub struct CancelToken {
    cancelled: Mutex<bool>,
    condvar: Condvar,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            cancelled: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Cancel the token, waking all waiting threads.
    pub fn cancel(&self) {
        if let Ok(mut cancelled) = self.cancelled.lock() {
            *cancelled = true;
        }
        self.condvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        // A poisoned lock means a holder panicked; treat as cancelled.
        self.cancelled.lock().map(|c| *c).unwrap_or(true)
    }

    /// Wait up to `duration` or until cancelled.
    ///
    /// Returns `true` if the token was cancelled, `false` if the full
    /// duration elapsed.
    pub fn wait(&self, duration: Duration) -> bool {
        let Ok(guard) = self.cancelled.lock() else {
            return true;
        };
        if *guard {
            return true;
        }
        match self
            .condvar
            .wait_timeout_while(guard, duration, |cancelled| !*cancelled)
        {
            Ok((guard, _)) => *guard,
            Err(_) => true,
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
