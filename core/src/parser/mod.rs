//! Parsers turning system tool output into records.
//!
//! Every tool gets a line parser of the form `fn(&str) -> Option<Record>`.
//! A line that is a header, is truncated, or carries an invalid PID or port
//! yields `None` and is skipped; a malformed line never fails a query.

pub mod normalize;
pub mod posix;
pub mod windows;

/// Parse a PID column. Only positive integers are accepted.
pub fn parse_pid(field: &str) -> Option<u32> {
    field.trim().parse::<u32>().ok().filter(|pid| *pid > 0)
}

/// Extract the port from an `address:port` string.
///
/// Handles IPv4 (`127.0.0.1:3000`, `*:8080`) and bracketed IPv6
/// (`[::1]:3000`). Port 0 is rejected.
pub fn port_from_address(address: &str) -> Option<u16> {
    let port_str = if address.starts_with('[') {
        let bracket_end = address.find(']')?;
        address.get(bracket_end + 1..)?.strip_prefix(':')?
    } else {
        let last_colon = address.rfind(':')?;
        &address[last_colon + 1..]
    };

    port_str.parse::<u16>().ok().filter(|port| *port > 0)
}

/// Pick the command line out of a command-line query.
///
/// `ps -o command=` prints it directly; PowerShell may print a
/// `CommandLine` header and a dashed underline first.
pub fn command_line_from_output(lines: &[String]) -> Option<String> {
    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .find(|line| *line != "CommandLine" && !line.chars().all(|c| c == '-'))
        .map(str::to_string)
}
