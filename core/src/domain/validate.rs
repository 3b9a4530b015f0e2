//! Input validation for port numbers, PIDs and process names.
//!
//! Validation runs before any command is built, so rejected input never
//! reaches a shell.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Longest accepted process name, in characters.
pub const MAX_PROCESS_NAME_LEN: usize = 255;

/// Characters that may not appear in a process name.
pub const FORBIDDEN_NAME_CHARS: &[char] = &['<', '>', '|', '&', ';', '$'];

/// Highest PID treated as a kernel/init-class process.
pub const MAX_SYSTEM_PID: u32 = 10;

/// What a process query should select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum ProcessSelector {
    All,
    Pid(u32),
    Name(String),
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Validate a port filter.
///
/// Empty or whitespace-only input is valid and means "all ports" (`None`).
pub fn validate_port(input: &str) -> Result<Option<u16>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if !is_all_digits(trimmed) {
        return Err(Error::Validation(format!("Invalid port number: {}", input)));
    }

    match trimmed.parse::<u16>() {
        Ok(port) if port >= 1 => Ok(Some(port)),
        _ => Err(Error::Validation(format!("Invalid port number: {}", input))),
    }
}

/// Validate a PID: a positive integer.
pub fn validate_pid(input: &str) -> Result<u32> {
    let trimmed = input.trim();
    if !is_all_digits(trimmed) {
        return Err(Error::Validation(format!("Invalid PID: {}", input)));
    }

    match trimmed.parse::<u32>() {
        Ok(pid) if pid > 0 => Ok(pid),
        _ => Err(Error::Validation(format!("Invalid PID: {}", input))),
    }
}

/// Validate a process name used as a search term.
pub fn validate_process_name(input: &str) -> Result<&str> {
    let name = input.trim();
    let valid = !name.is_empty()
        && name.chars().count() <= MAX_PROCESS_NAME_LEN
        && !name.contains(FORBIDDEN_NAME_CHARS);

    if valid {
        Ok(name)
    } else {
        Err(Error::Validation(format!("Invalid process name: {}", input)))
    }
}

/// Interpret a process query: nothing, a PID, or a name.
///
/// All-digit input is a PID and must be positive; `-` followed by digits
/// is rejected as a negative PID rather than searched for as a name.
pub fn validate_process_identifier(input: &str) -> Result<ProcessSelector> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(ProcessSelector::All);
    }

    if is_all_digits(trimmed) {
        return validate_pid(trimmed).map(ProcessSelector::Pid);
    }

    if let Some(rest) = trimmed.strip_prefix('-') {
        if is_all_digits(rest) {
            return Err(Error::Validation(format!("Invalid PID: {}", input)));
        }
    }

    validate_process_name(trimmed).map(|name| ProcessSelector::Name(name.to_string()))
}

/// Low-PID heuristic for kernel/init-class processes (0 through 10).
///
/// This is independent of [`validate_pid`]: PID 0 is already rejected
/// there, but 1..=10 pass validation and are caught here.
pub fn is_system_process(pid: u32) -> bool {
    pid <= MAX_SYSTEM_PID
}
