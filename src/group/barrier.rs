//! Completion barrier: counts workers still running for the current call.
//!
//! Every launched worker owns a [`CompletionGuard`]. Dropping the guard is
//! the only way to complete, so the count falls exactly once per worker on
//! every exit path, including panics and jobs discarded before they ran.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::trace;

/// Counting latch guarded by a mutex and condition variable.
#[derive(Debug, Default)]
pub struct CompletionBarrier {
    outstanding: Mutex<usize>,
    quiesced: Condvar,
}

impl CompletionBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more running worker and hand out its guard.
    pub fn issue(self: &Arc<Self>) -> CompletionGuard {
        *self.outstanding.lock() += 1;
        CompletionGuard {
            barrier: Arc::clone(self),
        }
    }

    fn complete(&self) {
        let mut outstanding = self.outstanding.lock();
        debug_assert!(*outstanding > 0, "completion without matching issue");
        *outstanding = outstanding.saturating_sub(1);
        trace!(outstanding = *outstanding, "Worker completed");
        self.quiesced.notify_all();
    }

    /// Workers still running.
    pub fn outstanding(&self) -> usize {
        *self.outstanding.lock()
    }

    /// Block until no worker is running.
    pub fn wait(&self) {
        let mut outstanding = self.outstanding.lock();
        while *outstanding != 0 {
            self.quiesced.wait(&mut outstanding);
        }
    }

    /// Block for at most `timeout`; returns whether the barrier cleared.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut outstanding = self.outstanding.lock();
        while *outstanding != 0 {
            if self.quiesced.wait_until(&mut outstanding, deadline).timed_out() {
                return *outstanding == 0;
            }
        }
        true
    }
}

/// Completes one worker on drop.
#[derive(Debug)]
#[must_use = "dropping the guard completes the worker immediately"]
pub struct CompletionGuard {
    barrier: Arc<CompletionBarrier>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.barrier.complete();
    }
}
