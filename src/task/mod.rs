//! Task subsystem
//!
//! Task control blocks and their lifecycle state machine.

pub mod state;
pub mod tcb;

pub use state::{AtomicTaskState, TaskState};
pub use tcb::{Tcb, TaskId};
