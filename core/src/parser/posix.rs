//! Parsers for `lsof` and `ps` output on macOS and Linux.

use tracing::debug;

use super::{normalize, parse_pid, port_from_address};
use crate::domain::{OperatingSystem, PortRecord, ProcessRecord};

/// Minimum number of columns in a usable `ps aux` row.
const PS_AUX_FIELDS: usize = 11;

/// Parse one `lsof -i -n -P` line.
///
/// ```text
/// COMMAND   PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
/// node     1234 alice   23u  IPv4 0x1234567890abcdef      0t0  TCP 127.0.0.1:3000 (LISTEN)
/// node     1234 alice   25u  IPv4 0x1234567890abcdef      0t0  TCP 127.0.0.1:3000->127.0.0.1:52144 (ESTABLISHED)
/// ```
///
/// The protocol comes from the NODE column, falling back to TYPE. The port
/// and addresses come from the NAME column.
pub fn parse_lsof_line(line: &str) -> Option<PortRecord> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("COMMAND") {
        return None;
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 {
        debug!(line = %line, "Skipping short lsof line");
        return None;
    }

    let Some(pid) = parse_pid(parts[1]) else {
        debug!(line = %line, "Skipping lsof line without a valid PID");
        return None;
    };

    let protocol = parts
        .get(7)
        .filter(|node| is_protocol(node))
        .copied()
        .unwrap_or(parts[4]);

    let Some(&name) = parts.get(8) else {
        debug!(line = %line, "Skipping lsof line without an address");
        return None;
    };
    let (local, remote) = name.split_once("->").unwrap_or((name, ""));

    let Some(port) = port_from_address(local) else {
        debug!(line = %line, "Skipping lsof line without a valid port");
        return None;
    };

    let state = parts
        .get(9)
        .filter(|s| s.starts_with('('))
        .map(|s| normalize::state(s))
        .unwrap_or_default();

    Some(
        PortRecord::new(
            port.to_string(),
            pid.to_string(),
            normalize::protocol(protocol),
            normalize::address(local),
        )
        .with_remote_address(normalize::address(remote))
        .with_state(state)
        .with_process_name(unescape_lsof(parts[0])),
    )
}

fn is_protocol(value: &str) -> bool {
    matches!(value.to_ascii_uppercase().as_str(), "TCP" | "UDP" | "SCTP")
}

/// lsof writes spaces in command names as `\x20`.
fn unescape_lsof(command: &str) -> String {
    command.replace("\\x20", " ")
}

pub fn parse_lsof_output(lines: &[String]) -> Vec<PortRecord> {
    lines.iter().filter_map(|line| parse_lsof_line(line)).collect()
}

/// Parse one `ps -p PID -o pid,user,comm,%mem` line.
///
/// ```text
///   PID USER     COMM             %MEM
///  1234 alice    /usr/bin/node     1.2
/// ```
pub fn parse_ps_pid_line(line: &str, os: OperatingSystem) -> Option<ProcessRecord> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("PID") {
        return None;
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    let (pid, user, name, memory) = match parts.as_slice() {
        [pid, user, name] => (*pid, *user, name.to_string(), ""),
        [pid, user, name @ .., memory] if !name.is_empty() => {
            (*pid, *user, name.join(" "), *memory)
        }
        _ => {
            debug!(line = %line, "Skipping short ps line");
            return None;
        }
    };

    let Some(pid) = parse_pid(pid) else {
        debug!(line = %line, "Skipping ps line without a valid PID");
        return None;
    };

    Some(
        ProcessRecord::new(pid.to_string(), normalize::process_name(&name, os))
            .with_user(user)
            .with_memory_usage(normalize::memory(memory))
            .with_command_line(name.trim()),
    )
}

pub fn parse_ps_pid_output(lines: &[String], os: OperatingSystem) -> Vec<ProcessRecord> {
    lines
        .iter()
        .filter_map(|line| parse_ps_pid_line(line, os))
        .collect()
}

/// Parse one `ps aux` line.
///
/// ```text
/// USER       PID %CPU %MEM    VSZ   RSS TTY      STAT START   TIME COMMAND
/// www-data  4321  1.5  0.8 123456  7890 ?        S    10:00   0:01 nginx: worker process
/// ```
pub fn parse_ps_aux_line(line: &str, os: OperatingSystem) -> Option<ProcessRecord> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("USER") {
        return None;
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < PS_AUX_FIELDS {
        debug!(line = %line, "Skipping short ps aux line");
        return None;
    }

    let Some(pid) = parse_pid(parts[1]) else {
        debug!(line = %line, "Skipping ps aux line without a valid PID");
        return None;
    };

    let command = parts[PS_AUX_FIELDS - 1..].join(" ");
    let name = normalize::process_name(parts[PS_AUX_FIELDS - 1], os);

    Some(
        ProcessRecord::new(pid.to_string(), name)
            .with_user(parts[0])
            .with_cpu_usage(normalize::cpu(parts[2]))
            .with_memory_usage(normalize::memory(parts[3]))
            .with_status(normalize::status(parts[7]))
            .with_command_line(command),
    )
}

pub fn parse_ps_aux_output(lines: &[String], os: OperatingSystem) -> Vec<ProcessRecord> {
    lines
        .iter()
        .filter_map(|line| parse_ps_aux_line(line, os))
        .collect()
}
