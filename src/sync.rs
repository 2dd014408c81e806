//! Suspension gate
//!
//! Binary hand-off primitive used to park and resume units. `acquire` blocks
//! until the gate is released; `release` opens it for exactly one pending
//! acquire. The scheduler releases a gate only after all state mutation for
//! a scheduling decision is complete, so the woken side always observes a
//! consistent scheduler state.

use std::process;
use std::sync::{Condvar, Mutex};

/// Abort the process with a diagnostic.
///
/// Synchronization-primitive failures mean the hand-off state is no longer
/// consistent; there is nothing safe to return to the caller.
pub(crate) fn fatal(msg: &str) -> ! {
    log::error!("[FATAL] {msg}");
    process::abort();
}

/// Release-once-per-acquire binary suspension primitive.
pub struct Gate {
    opened: Mutex<bool>,
    cond: Condvar,
}

impl Gate {
    /// Create a closed gate.
    pub fn new() -> Self {
        Self {
            opened: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Block until the gate is released, then close it again.
    pub fn acquire(&self) {
        let mut opened = self
            .opened
            .lock()
            .unwrap_or_else(|_| fatal("gate mutex poisoned"));
        while !*opened {
            opened = self
                .cond
                .wait(opened)
                .unwrap_or_else(|_| fatal("gate wait failed"));
        }
        *opened = false;
    }

    /// Open the gate, waking one pending acquire.
    pub fn release(&self) {
        let mut opened = self
            .opened
            .lock()
            .unwrap_or_else(|_| fatal("gate mutex poisoned"));
        *opened = true;
        self.cond.notify_one();
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn release_before_acquire_does_not_block() {
        let gate = Gate::new();
        gate.release();
        gate.acquire();
    }

    #[test]
    fn acquire_closes_the_gate_again() {
        let gate = Arc::new(Gate::new());
        gate.release();
        gate.acquire();

        // A second acquire must block until the next release.
        let g = Arc::clone(&gate);
        let waiter = thread::spawn(move || g.acquire());
        gate.release();
        waiter.join().unwrap();
    }

    #[test]
    fn hands_off_across_threads() {
        let gate = Arc::new(Gate::new());
        let g = Arc::clone(&gate);
        let parked = thread::spawn(move || {
            g.acquire();
            42u32
        });
        gate.release();
        assert_eq!(parked.join().unwrap(), 42);
    }
}
