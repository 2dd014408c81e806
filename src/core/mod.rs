//! Scheduler core module

pub mod error;
pub mod scheduler;

pub use error::{Result, SchedError};
pub use scheduler::{Scheduler, MAX_IO_DEVICES, MAX_PRIORITY};
