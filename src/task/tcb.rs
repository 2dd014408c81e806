//! Task control block
//!
//! Per-unit metadata plus the suspension gate the scheduler uses to park and
//! resume the unit's backing OS thread.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use std::thread::JoinHandle;

use crate::sync::{fatal, Gate};

use super::state::{AtomicTaskState, TaskState};

/// Task ID type
pub type TaskId = u64;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a fresh process-wide task ID.
pub(crate) fn alloc_task_id() -> TaskId {
    NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed)
}

/// Task Control Block (TCB)
///
/// `state` and `quantum` are only ever mutated by the scheduling decision,
/// which is serialized; the atomics exist so the backing thread can read its
/// own state without taking the scheduler lock.
pub struct Tcb {
    /// Unique task ID
    id: TaskId,

    /// Priority, immutable after creation
    priority: u32,

    /// Current lifecycle state
    state: AtomicTaskState,

    /// Ticks left on the processor while running
    quantum: AtomicU32,

    /// Suspension gate owned exclusively by this task
    gate: Gate,

    /// Backing OS thread, joined during reclamation
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Tcb {
    /// Create a new TCB in the Ready state with a full quantum.
    pub(crate) fn new(id: TaskId, priority: u32, quantum: u32) -> Self {
        Self {
            id,
            priority,
            state: AtomicTaskState::new(TaskState::Ready),
            quantum: AtomicU32::new(quantum),
            gate: Gate::new(),
            join: Mutex::new(None),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn state(&self) -> TaskState {
        self.state.load()
    }

    pub(crate) fn set_state(&self, state: TaskState) {
        self.state.store(state);
    }

    pub(crate) fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Remaining ticks before this task becomes eligible for round-robin.
    pub fn quantum(&self) -> u32 {
        self.quantum.load(Ordering::Acquire)
    }

    /// Burn one tick of quantum. Saturates at zero; the decision either
    /// rotates the task or refills the quantum once it hits zero.
    pub(crate) fn consume_quantum(&self) {
        let left = self.quantum.load(Ordering::Acquire);
        self.quantum.store(left.saturating_sub(1), Ordering::Release);
    }

    pub(crate) fn reset_quantum(&self, quantum: u32) {
        self.quantum.store(quantum, Ordering::Release);
    }

    pub(crate) fn attach_join(&self, handle: JoinHandle<()>) {
        let mut join = self
            .join
            .lock()
            .unwrap_or_else(|_| fatal("tcb join slot poisoned"));
        *join = Some(handle);
    }

    pub(crate) fn take_join(&self) -> Option<JoinHandle<()>> {
        self.join
            .lock()
            .unwrap_or_else(|_| fatal("tcb join slot poisoned"))
            .take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_tcb_is_ready_with_full_quantum() {
        let tcb = Tcb::new(alloc_task_id(), 3, 4);
        assert_eq!(tcb.state(), TaskState::Ready);
        assert_eq!(tcb.priority(), 3);
        assert_eq!(tcb.quantum(), 4);
    }

    #[test]
    fn quantum_saturates_at_zero() {
        let tcb = Tcb::new(alloc_task_id(), 0, 1);
        tcb.consume_quantum();
        tcb.consume_quantum();
        assert_eq!(tcb.quantum(), 0);
        tcb.reset_quantum(5);
        assert_eq!(tcb.quantum(), 5);
    }

    #[test]
    fn task_ids_are_unique() {
        let a = alloc_task_id();
        let b = alloc_task_id();
        assert_ne!(a, b);
    }
}
