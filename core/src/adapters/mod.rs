//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.

mod shell;

pub use shell::{find_executable, ShellExecutor, DEFAULT_COMMAND_TIMEOUT, DEFAULT_MAX_CONCURRENT};
