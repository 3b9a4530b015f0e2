//! Parsers for `netstat -ano` and `tasklist /FO CSV` output.

use tracing::debug;

use super::{normalize, parse_pid, port_from_address};
use crate::domain::{OperatingSystem, PortRecord, ProcessRecord};

/// Parse one `netstat -ano` line.
///
/// ```text
///   Proto  Local Address          Foreign Address        State           PID
///   TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       1020
///   UDP    0.0.0.0:53             *:*                                    9012
/// ```
///
/// UDP rows have no state column and are accepted with four fields.
pub fn parse_netstat_line(line: &str) -> Option<PortRecord> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("Active") || line.starts_with("Proto") {
        return None;
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    let (protocol, local, remote, state, pid) = match parts.as_slice() {
        [protocol, local, remote, state, pid, ..] => (*protocol, *local, *remote, *state, *pid),
        [protocol, local, remote, pid] if protocol.eq_ignore_ascii_case("UDP") => {
            (*protocol, *local, *remote, "", *pid)
        }
        _ => {
            debug!(line = %line, "Skipping short netstat line");
            return None;
        }
    };

    let Some(pid) = parse_pid(pid) else {
        debug!(line = %line, "Skipping netstat line without a valid PID");
        return None;
    };
    let Some(port) = port_from_address(local) else {
        debug!(line = %line, "Skipping netstat line without a valid port");
        return None;
    };

    Some(
        PortRecord::new(
            port.to_string(),
            pid.to_string(),
            normalize::protocol(protocol),
            normalize::address(local),
        )
        .with_remote_address(normalize::address(remote))
        .with_state(normalize::state(state)),
    )
}

pub fn parse_netstat_output(lines: &[String]) -> Vec<PortRecord> {
    lines.iter().filter_map(|line| parse_netstat_line(line)).collect()
}

/// Parse one `tasklist /FO CSV /NH` row.
///
/// ```text
/// "node.exe","5432","Console","1","45,000 K"
/// ```
///
/// The session name stands in for the user. The image name doubles as the
/// command line until a full one is resolved.
pub fn parse_tasklist_line(line: &str) -> Option<ProcessRecord> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("\"Image Name\"") {
        return None;
    }

    let fields = split_csv_fields(line);
    if fields.len() < 5 {
        // Also covers "INFO: No tasks are running which match ..."
        debug!(line = %line, "Skipping short tasklist line");
        return None;
    }

    let Some(pid) = parse_pid(fields[1]) else {
        debug!(line = %line, "Skipping tasklist line without a valid PID");
        return None;
    };

    let name = normalize::process_name(fields[0], OperatingSystem::Windows);
    Some(
        ProcessRecord::new(pid.to_string(), name)
            .with_user(fields[2].trim())
            .with_memory_usage(normalize::memory(fields[4]))
            .with_command_line(fields[0].trim())
            .with_status("Running"),
    )
}

pub fn parse_tasklist_output(lines: &[String]) -> Vec<ProcessRecord> {
    lines.iter().filter_map(|line| parse_tasklist_line(line)).collect()
}

/// Split a `tasklist` CSV row into fields without their surrounding quotes.
///
/// Commas inside a quoted field, as in `"12,345 K"`, belong to the field.
/// A field whose closing quote is missing is dropped.
fn split_csv_fields(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut rest = line.trim();

    while !rest.is_empty() {
        let (field, tail) = match rest.strip_prefix('"') {
            Some(quoted) => match quoted.find('"') {
                Some(end) => (&quoted[..end], &quoted[end + 1..]),
                None => break,
            },
            None => match rest.find(',') {
                Some(end) => rest.split_at(end),
                None => (rest, ""),
            },
        };

        fields.push(field);
        rest = tail.strip_prefix(',').unwrap_or(tail);
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_netstat_output() {
        let output = lines(
            r#"
Active Connections

  Proto  Local Address          Foreign Address        State           PID
  TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       1020
  TCP    127.0.0.1:3000         127.0.0.1:52144        ESTABLISHED     5432
  TCP    [::]:445               [::]:0                 LISTENING       4
  UDP    0.0.0.0:53             *:*                                    9012
"#,
        );

        let records = parse_netstat_output(&output);
        assert_eq!(records.len(), 4);

        assert_eq!(records[0].port, "135");
        assert_eq!(records[0].pid, "1020");
        assert_eq!(records[0].protocol, "TCP");
        assert_eq!(records[0].local_address, "0.0.0.0:135");
        assert_eq!(records[0].remote_address, "*");
        assert_eq!(records[0].state, "LISTEN");

        assert_eq!(records[1].state, "ESTAB");
        assert_eq!(records[1].remote_address, "127.0.0.1:52144");

        assert_eq!(records[2].port, "445");
        assert_eq!(records[2].local_address, "[::]:445");

        assert_eq!(records[3].protocol, "UDP");
        assert_eq!(records[3].port, "53");
        assert_eq!(records[3].pid, "9012");
        assert_eq!(records[3].state, "");
    }

    #[test]
    fn test_netstat_skips_invalid_lines() {
        assert!(parse_netstat_line("  TCP    0.0.0.0:135").is_none());
        assert!(parse_netstat_line("  TCP    0.0.0.0:135  0.0.0.0:0  LISTENING  abc").is_none());
        assert!(parse_netstat_line("  TCP    127.0.0.1:5000  10.0.0.1:443  TIME_WAIT  0").is_none());
        assert!(parse_netstat_line("  TCP    0.0.0.0:99999  0.0.0.0:0  LISTENING  12").is_none());
        assert!(parse_netstat_line("").is_none());
    }

    #[test]
    fn test_parse_tasklist_output() {
        let output = lines(
            r#""System Idle Process","0","Services","0","8 K"
"node.exe","5432","Console","1","45,000 K"
"svchost.exe","1020","Services","0","12,345 K""#,
        );

        let records = parse_tasklist_output(&output);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].pid, "5432");
        assert_eq!(records[0].name, "node");
        assert_eq!(records[0].user, "Console");
        assert_eq!(records[0].memory_usage, "45000 KB");
        assert_eq!(records[0].command_line, "node.exe");
        assert_eq!(records[0].status, "Running");

        assert_eq!(records[1].name, "svchost");
    }

    #[test]
    fn test_tasklist_no_match_message() {
        let output = lines("INFO: No tasks are running which match the specified criteria.");
        assert!(parse_tasklist_output(&output).is_empty());
    }

    #[test]
    fn test_split_csv_fields() {
        let fields = split_csv_fields(r#""Image Name","PID","Mem Usage""#);
        assert_eq!(fields, vec!["Image Name", "PID", "Mem Usage"]);

        let fields = split_csv_fields(r#""node.exe","5432","Console","1","45,000 K""#);
        assert_eq!(fields, vec!["node.exe", "5432", "Console", "1", "45,000 K"]);

        let fields = split_csv_fields("a,b,c");
        assert_eq!(fields, vec!["a", "b", "c"]);

        let fields = split_csv_fields(r#""","x",,"y""#);
        assert_eq!(fields, vec!["", "x", "", "y"]);

        let fields = split_csv_fields(r#""app.exe","12"#);
        assert_eq!(fields, vec!["app.exe"]);
    }
}
