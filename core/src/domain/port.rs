//! Port binding records.

use serde::{Deserialize, Serialize};

/// Placeholder used when the owning process cannot be identified.
pub const UNKNOWN_PROCESS: &str = "Unknown";

/// Information about one socket binding and the process that owns it.
///
/// Every field is a plain string as reported by the OS tool. Optional
/// columns are filled with placeholders rather than modelled as `Option`,
/// so consumers can render them without branching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRecord {
    /// Port number as reported (e.g. "8080").
    pub port: String,

    /// Owning process ID; empty when the OS does not associate one.
    pub pid: String,

    /// Protocol, uppercased ("TCP", "UDP").
    pub protocol: String,

    /// Local endpoint in host:port form.
    pub local_address: String,

    /// Remote endpoint; empty when not applicable.
    #[serde(default)]
    pub remote_address: String,

    /// Connection state (LISTEN, ESTAB, ...); empty when omitted.
    #[serde(default)]
    pub state: String,

    /// Name of the owning process.
    #[serde(default = "unknown_process")]
    pub process_name: String,

    /// Full command line of the owning process.
    #[serde(default = "placeholder")]
    pub command_line: String,
}

fn unknown_process() -> String {
    UNKNOWN_PROCESS.to_string()
}

fn placeholder() -> String {
    "-".to_string()
}

impl PortRecord {
    /// Create a record from the four required columns.
    pub fn new(
        port: impl Into<String>,
        pid: impl Into<String>,
        protocol: impl Into<String>,
        local_address: impl Into<String>,
    ) -> Self {
        Self {
            port: port.into(),
            pid: pid.into(),
            protocol: protocol.into(),
            local_address: local_address.into(),
            remote_address: String::new(),
            state: String::new(),
            process_name: unknown_process(),
            command_line: placeholder(),
        }
    }

    pub fn with_remote_address(mut self, remote: impl Into<String>) -> Self {
        self.remote_address = remote.into();
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// Set the process name; an empty name keeps the "Unknown" placeholder.
    pub fn with_process_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.process_name = name;
        }
        self
    }

    /// Set the command line; an empty value keeps the "-" placeholder.
    pub fn with_command_line(mut self, command_line: impl Into<String>) -> Self {
        let command_line = command_line.into();
        if !command_line.trim().is_empty() {
            self.command_line = command_line;
        }
        self
    }

    /// Identifier used by selection-based consumers (the owning PID).
    pub fn id(&self) -> &str {
        &self.pid
    }

    /// Port number parsed, if it is within 1..=65535.
    pub fn port_number(&self) -> Option<u16> {
        self.port.trim().parse::<u16>().ok().filter(|p| *p > 0)
    }

    pub fn is_valid_port(&self) -> bool {
        self.port_number().is_some()
    }

    pub fn is_valid_pid(&self) -> bool {
        matches!(self.pid.trim().parse::<u32>(), Ok(pid) if pid > 0)
    }

    /// List the required fields that are missing.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.port.trim().is_empty() {
            errors.push("port is required".to_string());
        }
        if self.pid.trim().is_empty() {
            errors.push("pid is required".to_string());
        }
        if self.protocol.trim().is_empty() {
            errors.push("protocol is required".to_string());
        }
        if self.local_address.trim().is_empty() {
            errors.push("localAddress is required".to_string());
        }
        errors
    }

    /// Check if this record matches a search query across its text fields.
    pub fn matches_search(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }

        let query_lower = query.to_lowercase();
        self.port.contains(&query_lower)
            || self.pid.contains(&query_lower)
            || self.protocol.to_lowercase().contains(&query_lower)
            || self.local_address.to_lowercase().contains(&query_lower)
            || self.remote_address.to_lowercase().contains(&query_lower)
            || self.process_name.to_lowercase().contains(&query_lower)
    }
}

impl std::fmt::Display for PortRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} (PID: {}, Process: {})",
            self.protocol, self.local_address, self.pid, self.process_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields_and_defaults() {
        let record = PortRecord::new("8080", "1234", "TCP", "127.0.0.1:8080");
        assert_eq!(record.port, "8080");
        assert_eq!(record.pid, "1234");
        assert_eq!(record.id(), "1234");
        assert_eq!(record.remote_address, "");
        assert_eq!(record.state, "");
        assert_eq!(record.process_name, "Unknown");
        assert_eq!(record.command_line, "-");
        assert!(record.validate().is_empty());
    }

    #[test]
    fn test_empty_name_keeps_placeholder() {
        let record = PortRecord::new("80", "1", "TCP", "*:80")
            .with_process_name("  ")
            .with_command_line("");
        assert_eq!(record.process_name, "Unknown");
        assert_eq!(record.command_line, "-");
    }

    #[test]
    fn test_validate_missing_fields() {
        let record = PortRecord::new("", "", "", "");
        assert_eq!(record.validate().len(), 4);
    }

    #[test]
    fn test_port_and_pid_validity() {
        let record = PortRecord::new("8080", "1234", "TCP", "127.0.0.1:8080");
        assert!(record.is_valid_port());
        assert!(record.is_valid_pid());

        assert!(!PortRecord::new("invalid", "1234", "TCP", "x").is_valid_port());
        assert!(!PortRecord::new("99999", "1234", "TCP", "x").is_valid_port());
        assert!(!PortRecord::new("8080", "invalid", "TCP", "x").is_valid_pid());
    }

    #[test]
    fn test_matches_search() {
        let record = PortRecord::new("3000", "1234", "TCP", "127.0.0.1:3000")
            .with_state("LISTEN")
            .with_process_name("node");

        assert!(record.matches_search("node"));
        assert!(record.matches_search("3000"));
        assert!(record.matches_search("tcp"));
        assert!(record.matches_search(""));
        assert!(!record.matches_search("nginx"));
    }

    #[test]
    fn test_serde_defaults() {
        let json = r#"{"port":"80","pid":"5678","protocol":"TCP","localAddress":"*:80"}"#;
        let record: PortRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.process_name, "Unknown");
        assert_eq!(record.remote_address, "");
        assert_eq!(record.command_line, "-");
    }
}
