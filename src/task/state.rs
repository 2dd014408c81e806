//! Task state machine
//!
//! Lifecycle states for a schedulable unit and an atomic wrapper so state
//! reads never tear across the hand-off.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Task state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskState {
    /// Queued and eligible to be dispatched
    Ready = 0,

    /// Currently holding the logical processor
    Running = 1,

    /// Parked on an abstract I/O device until signalled
    Waiting = 2,

    /// Handler returned; pending reclamation
    Terminated = 3,
}

impl TaskState {
    /// Convert from raw value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Ready),
            1 => Some(Self::Running),
            2 => Some(Self::Waiting),
            3 => Some(Self::Terminated),
            _ => None,
        }
    }

    /// Check if the state is eligible for dispatch
    pub fn is_schedulable(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Check if the unit still occupies the processor illusion
    pub fn is_active(self) -> bool {
        matches!(self, Self::Ready | Self::Running)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "Ready"),
            Self::Running => write!(f, "Running"),
            Self::Waiting => write!(f, "Waiting"),
            Self::Terminated => write!(f, "Terminated"),
        }
    }
}

/// Atomic task state
pub struct AtomicTaskState {
    state: AtomicU8,
}

impl AtomicTaskState {
    /// Create new atomic state
    pub const fn new(state: TaskState) -> Self {
        Self {
            state: AtomicU8::new(state as u8),
        }
    }

    /// Load current state
    pub fn load(&self) -> TaskState {
        let value = self.state.load(Ordering::Acquire);
        TaskState::from_u8(value).unwrap_or(TaskState::Ready)
    }

    /// Store new state
    pub fn store(&self, state: TaskState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip() {
        for state in [
            TaskState::Ready,
            TaskState::Running,
            TaskState::Waiting,
            TaskState::Terminated,
        ] {
            assert_eq!(TaskState::from_u8(state as u8), Some(state));
        }
        assert_eq!(TaskState::from_u8(9), None);
    }

    #[test]
    fn schedulability() {
        assert!(TaskState::Ready.is_schedulable());
        assert!(!TaskState::Running.is_schedulable());
        assert!(!TaskState::Waiting.is_active());
        assert!(TaskState::Running.is_active());
    }

    #[test]
    fn atomic_store_load() {
        let state = AtomicTaskState::new(TaskState::Ready);
        assert_eq!(state.load(), TaskState::Ready);
        state.store(TaskState::Waiting);
        assert_eq!(state.load(), TaskState::Waiting);
    }
}
