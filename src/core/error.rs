//! Scheduler error handling
//!
//! Typed errors for every recoverable failure. Configuration and usage
//! errors are returned without mutating scheduler state; synchronization
//! failures are never surfaced here — they abort the process, because an
//! inconsistent hand-off state cannot be safely continued.

use std::error;
use std::fmt;

/// Result alias for scheduler operations.
pub type Result<T> = std::result::Result<T, SchedError>;

/// Scheduler error types with context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedError {
    /// A process-wide scheduler is already installed
    AlreadyInitialized,

    /// No process-wide scheduler has been installed
    NotInitialized,

    /// Time quantum must be positive
    InvalidQuantum,

    /// Requested more abstract I/O devices than supported
    TooManyIoDevices { requested: u32, max: u32 },

    /// Priority outside `[0, MAX_PRIORITY]`
    InvalidPriority { value: u32, max: u32 },

    /// I/O device id outside the configured range
    InvalidIoDevice { io_id: u32, count: u32 },

    /// Operation requires a currently running unit
    NoRunningTask,
}

impl SchedError {
    /// Configuration error: wrong lifecycle or init parameters.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::AlreadyInitialized
                | Self::NotInitialized
                | Self::InvalidQuantum
                | Self::TooManyIoDevices { .. }
        )
    }

    /// Usage error: bad argument to a scheduling entry point.
    pub fn is_usage(&self) -> bool {
        !self.is_config()
    }
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::AlreadyInitialized => {
                write!(f, "scheduler already initialized")
            }
            Self::NotInitialized => {
                write!(f, "scheduler not initialized")
            }
            Self::InvalidQuantum => {
                write!(f, "time quantum must be positive")
            }
            Self::TooManyIoDevices { requested, max } => {
                write!(f, "requested {requested} I/O devices, maximum is {max}")
            }
            Self::InvalidPriority { value, max } => {
                write!(f, "priority {value} out of range (max {max})")
            }
            Self::InvalidIoDevice { io_id, count } => {
                write!(f, "I/O device {io_id} out of range ({count} configured)")
            }
            Self::NoRunningTask => {
                write!(f, "no unit is currently running")
            }
        }
    }
}

impl error::Error for SchedError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(SchedError::InvalidQuantum.is_config());
        assert!(SchedError::AlreadyInitialized.is_config());
        assert!(SchedError::InvalidPriority { value: 9, max: 5 }.is_usage());
        assert!(SchedError::NoRunningTask.is_usage());
    }

    #[test]
    fn display_carries_context() {
        let err = SchedError::InvalidIoDevice { io_id: 7, count: 2 };
        assert_eq!(err.to_string(), "I/O device 7 out of range (2 configured)");
    }
}
