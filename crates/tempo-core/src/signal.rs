//! Cooperative shutdown signal.

use parking_lot::{Condvar, Mutex};
use std::time::Duration;

/// A stop flag that sleepers can wait on.
///
/// [`wait_timeout`](Self::wait_timeout) returns early as soon as
/// [`trigger`](Self::trigger) is called from any thread.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    triggered: Mutex<bool>,
    cvar: Condvar,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake every waiter. Idempotent.
    pub fn trigger(&self) {
        let mut triggered = self.triggered.lock();
        *triggered = true;
        self.cvar.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.triggered.lock()
    }

    /// Clear the flag so the signal can be reused for another run.
    pub fn reset(&self) {
        *self.triggered.lock() = false;
    }

    /// Sleep for up to `timeout`. Returns `true` if the signal was triggered.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut triggered = self.triggered.lock();
        if !*triggered {
            // Spurious wakeups only shorten the sleep; callers re-check.
            let _ = self.cvar.wait_for(&mut triggered, timeout);
        }
        *triggered
    }
}
