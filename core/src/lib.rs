//! Portscope Core Library
//!
//! Cross-platform port and process discovery built on the tools every
//! system already ships: `netstat`, `tasklist` and `taskkill` on Windows,
//! `lsof`, `ps` and `kill` on macOS and Linux.
//!
//! Provides functionality to:
//! - List socket bindings, optionally for one port
//! - List processes by PID or name, and filter them by user, CPU or memory
//! - Force-kill a batch of PIDs with per-PID outcomes
//! - Report which required tools are installed
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Records, validators and kill results
//! - `command`: Per-OS command lines and shell escaping
//! - `parser`: Tool output to records
//! - `ports`: The [`CommandExecutor`] trait
//! - `adapters`: [`ShellExecutor`], the `tokio::process` implementation
//! - `application`: Query, kill and system info services
//!
//! # Example
//! ```no_run
//! use portscope_core::{OperatingSystem, PortQueryService, ShellExecutor};
//!
//! # async fn run() -> portscope_core::Result<()> {
//! let os = OperatingSystem::detect();
//! let service = PortQueryService::new(ShellExecutor::new(os), os);
//! for record in service.query("8080").await? {
//!     println!("{}", record);
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod command;
pub mod config;
pub mod domain;
pub mod error;
pub mod parser;
pub mod ports;
pub mod table;

// Re-export domain types (primary API)
pub use domain::{
    KillBatchResult, KillOutcome, KillSummary, OperatingSystem, PortRecord, ProcessFilter,
    ProcessRecord, ProcessSelector,
};

// Re-export other commonly used types
pub use adapters::{find_executable, ShellExecutor};
pub use application::{KillService, PortQueryService, ProcessQueryService, SystemInfo};
pub use command::{CommandBuilder, QueryIntent, ShellCommand};
pub use config::{Config, ConfigStore};
pub use error::{Error, Result};
pub use ports::{CommandExecutor, CommandOutput, OutputMode};
