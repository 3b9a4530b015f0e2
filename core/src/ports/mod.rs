//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with external systems. Implementations live in `adapters`.

mod executor;

pub use executor::{CommandExecutor, CommandOutput, OutputMode};
