//! monosched - single logical processor scheduler
//!
//! A user-level scheduler that emulates one logical processor running
//! priority-based, quantum-preemptive scheduling over explicitly-registered
//! units of work, each backed by a real OS thread. Units yield cooperatively
//! at explicit checkpoints ([`tick`]) and block on abstract I/O devices
//! ([`wait`]/[`signal`]); a gate hand-off protocol guarantees at most one
//! unit executes application logic at any instant.
//!
//! Preemption only happens at scheduler entry points: there are no timer
//! interrupts, no parallel execution of handlers, and no cancellation —
//! units always run to completion.
//!
//! # Example
//!
//! ```
//! use monosched::Scheduler;
//! use std::sync::Arc;
//!
//! let sched = Arc::new(Scheduler::new(2, 1).unwrap());
//! let s = Arc::clone(&sched);
//! sched
//!     .spawn(
//!         move |_priority| {
//!             // One unit of simulated CPU work, then a checkpoint.
//!             s.tick();
//!         },
//!         3,
//!     )
//!     .unwrap();
//! sched.shutdown();
//! ```
//!
//! Most applications instead install a single process-wide scheduler with
//! [`init`] and use the free functions below from inside their handlers.

pub mod core;
pub mod queue;
pub mod sync;
pub mod task;

pub use self::core::{Result, SchedError, Scheduler, MAX_IO_DEVICES, MAX_PRIORITY};
pub use self::queue::PrioQueue;
pub use self::sync::Gate;
pub use self::task::{TaskId, TaskState};

use std::sync::{Arc, Mutex, MutexGuard};

use self::sync::fatal;

/// Process-wide scheduler slot, installed by [`init`], cleared by [`shutdown`].
static SCHEDULER: Mutex<Option<Arc<Scheduler>>> = Mutex::new(None);

fn slot() -> MutexGuard<'static, Option<Arc<Scheduler>>> {
    SCHEDULER
        .lock()
        .unwrap_or_else(|_| fatal("scheduler slot poisoned"))
}

fn instance() -> Result<Arc<Scheduler>> {
    slot().as_ref().cloned().ok_or(SchedError::NotInitialized)
}

/// Install the process-wide scheduler.
///
/// Fails with [`SchedError::AlreadyInitialized`] if one is installed,
/// [`SchedError::InvalidQuantum`] for a zero quantum, and
/// [`SchedError::TooManyIoDevices`] above [`MAX_IO_DEVICES`].
pub fn init(max_quantum: u32, io_count: u32) -> Result<()> {
    let mut slot = slot();
    if slot.is_some() {
        return Err(SchedError::AlreadyInitialized);
    }
    let sched = Scheduler::new(max_quantum, io_count)?;
    log::info!("[INIT] scheduler online: quantum={max_quantum} io_count={io_count}");
    *slot = Some(Arc::new(sched));
    Ok(())
}

/// Register a handler as a schedulable unit on the process-wide scheduler.
pub fn spawn(handler: impl FnOnce(u32) + Send + 'static, priority: u32) -> Result<TaskId> {
    instance()?.spawn(handler, priority)
}

/// Park the running unit until `io_id` is signalled.
pub fn wait(io_id: u32) -> Result<()> {
    instance()?.wait(io_id)
}

/// Wake every unit waiting on `io_id`; returns the number woken.
pub fn signal(io_id: u32) -> Result<usize> {
    instance()?.signal(io_id)
}

/// Checkpoint after one unit of simulated CPU work.
pub fn tick() -> Result<()> {
    instance()?.tick();
    Ok(())
}

/// Join barrier: wait for every spawned unit to finish, reclaim them, and
/// clear the process-wide slot. No-op if no scheduler is installed.
pub fn shutdown() {
    let sched = slot().as_ref().cloned();
    let Some(sched) = sched else { return };
    // The slot stays populated while units drain so handlers can keep using
    // the free functions; it is cleared only once the join barrier passes.
    sched.shutdown();
    let _ = slot().take();
}
