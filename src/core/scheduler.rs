//! Scheduler core
//!
//! Emulates a single logical processor over real OS threads. Every entry
//! point funnels into one scheduling decision that mutates queue membership
//! and releases exactly one gate; the caller, if it was the running unit,
//! then parks on its own gate until rescheduled. Because the gate for unit X
//! is released only after all state mutation of the decision that selected
//! X, at most one unit ever executes application logic at a time and the
//! scheduler state is never observed mid-mutation.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use crate::core::error::{Result, SchedError};
use crate::queue::PrioQueue;
use crate::sync::{fatal, Gate};
use crate::task::tcb::alloc_task_id;
use crate::task::{TaskId, TaskState, Tcb};

/// Highest priority a unit may be spawned with.
pub const MAX_PRIORITY: u32 = 5;

/// Upper bound on the number of abstract I/O devices.
pub const MAX_IO_DEVICES: u32 = 256;

struct Inner {
    /// The unit currently holding the logical processor
    current: Option<Arc<Tcb>>,

    /// Ready units, descending priority, FIFO among equals
    ready: PrioQueue<Arc<Tcb>>,

    /// One FIFO queue of waiting units per abstract I/O device
    waiting: Vec<VecDeque<Arc<Tcb>>>,

    /// Terminated units pending reclamation
    finished: Vec<Arc<Tcb>>,

    /// Total units ever spawned
    spawned: u64,
}

/// Scheduler context object
///
/// One instance emulates one logical processor. Usually installed
/// process-wide via [`crate::init`], but directly constructible for embedded
/// or test use.
pub struct Scheduler {
    max_quantum: u32,
    io_count: u32,
    shutdown_gate: Gate,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("max_quantum", &self.max_quantum)
            .field("io_count", &self.io_count)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Create a scheduler with the given time quantum and number of abstract
    /// I/O devices.
    pub fn new(max_quantum: u32, io_count: u32) -> Result<Self> {
        if max_quantum == 0 {
            return Err(SchedError::InvalidQuantum);
        }
        if io_count > MAX_IO_DEVICES {
            return Err(SchedError::TooManyIoDevices {
                requested: io_count,
                max: MAX_IO_DEVICES,
            });
        }

        Ok(Self {
            max_quantum,
            io_count,
            shutdown_gate: Gate::new(),
            inner: Mutex::new(Inner {
                current: None,
                ready: PrioQueue::new(|a: &Arc<Tcb>, b: &Arc<Tcb>| {
                    a.priority().cmp(&b.priority())
                }),
                waiting: (0..io_count).map(|_| VecDeque::new()).collect(),
                finished: Vec::new(),
                spawned: 0,
            }),
        })
    }

    /// Configured time quantum.
    pub fn max_quantum(&self) -> u32 {
        self.max_quantum
    }

    /// Register a handler as a schedulable unit.
    ///
    /// The backing thread starts immediately but parks on its gate until the
    /// decision dispatches it. A caller that is itself a running unit yields
    /// cooperatively: it parks on its own gate after the decision. The very
    /// first spawn returns without parking, since the initializing context is
    /// not a scheduled unit.
    pub fn spawn(
        self: &Arc<Self>,
        handler: impl FnOnce(u32) + Send + 'static,
        priority: u32,
    ) -> Result<TaskId> {
        if priority > MAX_PRIORITY {
            return Err(SchedError::InvalidPriority {
                value: priority,
                max: MAX_PRIORITY,
            });
        }

        let tcb = Arc::new(Tcb::new(alloc_task_id(), priority, self.max_quantum));
        let id = tcb.id();

        let sched = Arc::clone(self);
        let unit = Arc::clone(&tcb);
        let handle = thread::Builder::new()
            .name(format!("unit-{id}"))
            .spawn(move || {
                // Park until dispatched for the first time.
                unit.gate().acquire();
                log::trace!("[SCHED] unit {} entering handler", unit.id());

                handler(unit.priority());

                unit.set_state(TaskState::Terminated);
                log::debug!("[SCHED] unit {} terminated", unit.id());
                let mut inner = sched.lock_inner();
                sched.reschedule(&mut inner);
            })
            .unwrap_or_else(|_| fatal("failed to start unit thread"));
        tcb.attach_join(handle);

        let mut inner = self.lock_inner();
        inner.ready.push(Arc::clone(&tcb));
        inner.spawned += 1;
        log::debug!(
            "[SPAWN] unit {id} priority {priority} ready ({} spawned total)",
            inner.spawned
        );

        let caller = inner.current.clone();
        self.reschedule(&mut inner);
        drop(inner);

        if let Some(caller) = caller {
            caller.gate().acquire();
        }
        Ok(id)
    }

    /// Park the running unit until `io_id` is signalled.
    pub fn wait(&self, io_id: u32) -> Result<()> {
        self.check_io(io_id)?;

        let mut inner = self.lock_inner();
        let current = match &inner.current {
            Some(task) if task.state() == TaskState::Running => Arc::clone(task),
            _ => return Err(SchedError::NoRunningTask),
        };

        current.set_state(TaskState::Waiting);
        inner.waiting[io_id as usize].push_back(Arc::clone(&current));
        log::debug!("[WAIT] unit {} parked on io {io_id}", current.id());

        self.reschedule(&mut inner);
        drop(inner);

        current.gate().acquire();
        Ok(())
    }

    /// Wake every unit waiting on `io_id`. Returns the number woken.
    pub fn signal(&self, io_id: u32) -> Result<usize> {
        self.check_io(io_id)?;

        let mut inner = self.lock_inner();
        let mut woken = 0;
        while let Some(task) = inner.waiting[io_id as usize].pop_front() {
            task.set_state(TaskState::Ready);
            inner.ready.push(task);
            woken += 1;
        }
        if woken > 0 {
            log::debug!("[SIGNAL] io {io_id} woke {woken} unit(s)");
        }

        let caller = match &inner.current {
            Some(task) if task.state() == TaskState::Running => Some(Arc::clone(task)),
            _ => None,
        };
        self.reschedule(&mut inner);
        drop(inner);

        // The caller parks only per the decision's own hand-off rules: its
        // gate was either released (it keeps running) or it was preempted.
        if let Some(caller) = caller {
            caller.gate().acquire();
        }
        Ok(woken)
    }

    /// Checkpoint after one unit of simulated CPU work.
    ///
    /// Burns one tick of the running unit's quantum and re-runs the decision.
    /// The only suspension point driven purely by CPU-time passage. No-op
    /// when no unit is running.
    pub fn tick(&self) {
        let mut inner = self.lock_inner();
        let current = match &inner.current {
            Some(task) if task.state() == TaskState::Running => Arc::clone(task),
            _ => return,
        };

        current.consume_quantum();
        self.reschedule(&mut inner);
        drop(inner);

        current.gate().acquire();
    }

    /// Join barrier: block until every spawned unit has terminated, then
    /// reclaim all backing threads. Returns immediately if no unit was ever
    /// spawned. Not a cancellation mechanism — units always run to
    /// completion.
    pub fn shutdown(&self) {
        let spawned = self.lock_inner().spawned;
        if spawned > 0 {
            log::debug!("[SHUTDOWN] waiting for {spawned} spawned unit(s)");
            self.shutdown_gate.acquire();
        }

        let mut inner = self.lock_inner();
        if let Some(current) = inner.current.take() {
            Self::reclaim(current);
        }
        while let Some(task) = inner.ready.pop() {
            Self::reclaim(task);
        }
        for queue in &mut inner.waiting {
            while let Some(task) = queue.pop_front() {
                Self::reclaim(task);
            }
        }
        for task in std::mem::take(&mut inner.finished) {
            Self::reclaim(task);
        }
        log::info!("[SHUTDOWN] scheduler drained");
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|_| fatal("scheduler state poisoned"))
    }

    fn check_io(&self, io_id: u32) -> Result<()> {
        if io_id >= self.io_count {
            return Err(SchedError::InvalidIoDevice {
                io_id,
                count: self.io_count,
            });
        }
        Ok(())
    }

    /// The scheduling decision. Serialized by the `inner` lock; releases
    /// exactly one gate per invocation (either the next unit's or the
    /// current unit's), or none when nothing is runnable.
    fn reschedule(&self, inner: &mut Inner) {
        if inner.ready.is_empty() {
            if let Some(current) = &inner.current {
                if current.state() == TaskState::Terminated {
                    log::debug!("[SCHED] last unit done, opening shutdown gate");
                    self.shutdown_gate.release();
                }
                // Sole runnable unit keeps the processor.
                current.gate().release();
            }
            return;
        }

        let current = match inner.current.clone() {
            Some(task) => task,
            None => return self.dispatch(inner),
        };

        match current.state() {
            TaskState::Waiting => return self.dispatch(inner),
            TaskState::Terminated => {
                if let Some(done) = inner.current.take() {
                    inner.finished.push(done);
                }
                return self.dispatch(inner);
            }
            _ => {}
        }

        let head_priority = match inner.ready.peek() {
            Some(head) => head.priority(),
            None => {
                current.gate().release();
                return;
            }
        };

        if current.priority() < head_priority {
            log::debug!(
                "[SCHED] unit {} preempted by priority {head_priority}",
                current.id()
            );
            Self::requeue(inner, current);
            return self.dispatch(inner);
        }

        if current.quantum() == 0 {
            if head_priority == current.priority() {
                log::debug!("[SCHED] unit {} out of quantum, rotating", current.id());
                Self::requeue(inner, current);
                return self.dispatch(inner);
            }
            // No equal-priority peer: refill and keep running.
            current.reset_quantum(self.max_quantum);
        }

        current.gate().release();
    }

    /// Pop the ready head, promote it to Running with a full quantum, and
    /// hand it the processor.
    fn dispatch(&self, inner: &mut Inner) {
        let next = match inner.ready.pop() {
            Some(task) => task,
            None => return,
        };
        next.set_state(TaskState::Running);
        next.reset_quantum(self.max_quantum);
        log::debug!(
            "[SCHED] dispatch unit {} (priority {})",
            next.id(),
            next.priority()
        );
        next.gate().release();
        inner.current = Some(next);
    }

    fn requeue(inner: &mut Inner, task: Arc<Tcb>) {
        task.set_state(TaskState::Ready);
        inner.ready.push(task);
    }

    fn reclaim(task: Arc<Tcb>) {
        if let Some(handle) = task.take_join() {
            if handle.join().is_err() {
                fatal("unit thread panicked");
            }
        }
    }
}
