//! Process records and process filtering.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Information about one running process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecord {
    /// Process ID.
    pub pid: String,

    /// Short process name (e.g. "nginx", "node").
    pub name: String,

    /// Owning user or session.
    #[serde(default = "placeholder")]
    pub user: String,

    /// CPU usage as reported, normalized to a percentage when numeric.
    #[serde(default = "placeholder")]
    pub cpu_usage: String,

    /// Memory usage ("2.3%", "2048 KB", ...).
    #[serde(default = "placeholder")]
    pub memory_usage: String,

    /// Full command line. Stored untruncated.
    #[serde(default = "placeholder")]
    pub command_line: String,

    /// Human-readable process status.
    #[serde(default = "unknown_status")]
    pub status: String,
}

fn placeholder() -> String {
    "-".to_string()
}

fn unknown_status() -> String {
    "Unknown".to_string()
}

/// Replace an empty value with the given placeholder.
fn or_default(value: String, default: fn() -> String) -> String {
    if value.trim().is_empty() {
        default()
    } else {
        value
    }
}

impl ProcessRecord {
    /// Create a record from the required PID and name; every other field
    /// holds its placeholder.
    pub fn new(pid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            pid: pid.into(),
            name: name.into(),
            user: placeholder(),
            cpu_usage: placeholder(),
            memory_usage: placeholder(),
            command_line: placeholder(),
            status: unknown_status(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = or_default(user.into(), placeholder);
        self
    }

    pub fn with_cpu_usage(mut self, cpu: impl Into<String>) -> Self {
        self.cpu_usage = or_default(cpu.into(), placeholder);
        self
    }

    pub fn with_memory_usage(mut self, memory: impl Into<String>) -> Self {
        self.memory_usage = or_default(memory.into(), placeholder);
        self
    }

    pub fn with_command_line(mut self, command_line: impl Into<String>) -> Self {
        self.command_line = or_default(command_line.into(), placeholder);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = or_default(status.into(), unknown_status);
        self
    }

    /// Identifier used by selection-based consumers.
    pub fn id(&self) -> &str {
        &self.pid
    }

    /// PID parsed as a number, if valid.
    pub fn pid_number(&self) -> Option<u32> {
        self.pid.trim().parse::<u32>().ok().filter(|pid| *pid > 0)
    }

    /// List the required fields that are missing.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.pid.trim().is_empty() {
            errors.push("pid is required".to_string());
        }
        if self.name.trim().is_empty() {
            errors.push("name is required".to_string());
        }
        errors
    }

    /// CPU usage as a number of percent, if it can be read.
    pub fn cpu_percent(&self) -> Option<f64> {
        self.cpu_usage.trim().trim_end_matches('%').trim().parse().ok()
    }

    /// Memory usage in bytes, if it is expressed as an absolute size.
    pub fn memory_bytes(&self) -> Option<u64> {
        parse_memory_size(&self.memory_usage)
    }
}

impl std::fmt::Display for ProcessRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (PID: {}, User: {})", self.name, self.pid, self.user)
    }
}

/// Parse a human memory size such as "50MB", "1.5GB", "2048 KB" or "1,024 K".
///
/// Percentages and unparseable values yield `None`.
pub fn parse_memory_size(text: &str) -> Option<u64> {
    static SIZE: OnceLock<Regex> = OnceLock::new();
    let re = SIZE.get_or_init(|| {
        Regex::new(r"(?i)^\s*([0-9][0-9,]*(?:\.[0-9]+)?)\s*([KMGT]?)(?:I?B)?\s*$")
            .expect("memory size pattern is valid")
    });

    let caps = re.captures(text)?;
    let value: f64 = caps[1].replace(',', "").parse().ok()?;
    let multiplier: u64 = match caps[2].to_ascii_uppercase().as_str() {
        "" => 1,
        "K" => 1 << 10,
        "M" => 1 << 20,
        "G" => 1 << 30,
        "T" => 1 << 40,
        _ => return None,
    };

    Some((value * multiplier as f64) as u64)
}

/// Criteria for narrowing a process listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessFilter {
    /// Only processes owned by this user.
    pub user: Option<String>,
    /// Only processes using at least this much CPU (percent).
    pub min_cpu: Option<f64>,
    /// Only processes using at least this much memory (bytes).
    pub min_memory: Option<u64>,
}

impl ProcessFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any criteria are set.
    pub fn is_active(&self) -> bool {
        self.user.is_some() || self.min_cpu.is_some() || self.min_memory.is_some()
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_min_cpu(mut self, percent: f64) -> Self {
        self.min_cpu = Some(percent);
        self
    }

    pub fn with_min_memory(mut self, bytes: u64) -> Self {
        self.min_memory = Some(bytes);
        self
    }

    /// Check if a process satisfies every set criterion.
    ///
    /// A process whose CPU or memory cannot be read never passes a threshold.
    pub fn matches(&self, process: &ProcessRecord) -> bool {
        if let Some(ref user) = self.user {
            if process.user != *user {
                return false;
            }
        }

        if let Some(min_cpu) = self.min_cpu {
            match process.cpu_percent() {
                Some(cpu) if cpu >= min_cpu => {}
                _ => return false,
            }
        }

        if let Some(min_memory) = self.min_memory {
            match process.memory_bytes() {
                Some(bytes) if bytes >= min_memory => {}
                _ => return false,
            }
        }

        true
    }
}

/// Apply a filter to a list of processes, preserving order.
pub fn filter_processes(processes: &[ProcessRecord], filter: &ProcessFilter) -> Vec<ProcessRecord> {
    processes
        .iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect()
}
