//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod kill;
mod os;
mod port;
mod process;
pub mod validate;

// Re-export all domain types
pub use kill::{
    KillBatchResult, KillOutcome, KillSummary, INVALID_PID_MESSAGE, NO_SELECTION_MESSAGE,
    SYSTEM_PROCESS_MESSAGE,
};
pub use os::OperatingSystem;
pub use port::{PortRecord, UNKNOWN_PROCESS};
pub use process::{filter_processes, parse_memory_size, ProcessFilter, ProcessRecord};
pub use validate::{
    is_system_process, validate_pid, validate_port, validate_process_identifier,
    validate_process_name, ProcessSelector,
};
