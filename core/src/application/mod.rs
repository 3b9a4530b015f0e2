//! Application layer - Use case services.
//!
//! Services are thin orchestrators that validate input, build the command
//! for the current OS, run it through a [`CommandExecutor`] and parse the
//! output into domain records. They hold no state between calls.
//!
//! [`CommandExecutor`]: crate::ports::CommandExecutor

mod kill_service;
mod port_service;
mod process_service;
mod system_info;

pub use kill_service::KillService;
pub use port_service::PortQueryService;
pub use process_service::ProcessQueryService;
pub use system_info::SystemInfo;

/// A named, human-readable description of one kind of query.
pub type QueryOption = (&'static str, &'static str);
