//! Command selection per operating system.
//!
//! Maps a query intent to the exact shell command line for each platform:
//!
//! | Intent          | Windows                                        | macOS / Linux                          |
//! |-----------------|------------------------------------------------|----------------------------------------|
//! | list ports      | `netstat -ano`                                 | `lsof -i -n -P`                        |
//! | port N          | `netstat -ano \| findstr :N`                   | `lsof -i :N -n -P`                     |
//! | list processes  | `tasklist /FO CSV /NH`                         | `ps aux`                               |
//! | process by PID  | `tasklist /FI "PID eq N" /FO CSV /NH`          | `ps -p N -o pid,user,comm,%mem`        |
//! | process by name | `tasklist /FI "IMAGENAME eq NAME*" /FO CSV /NH`| `ps aux \| grep -i -e NAME \| grep -v grep`|
//! | command line    | PowerShell `Get-WmiObject Win32_Process`       | `ps -p N -o command=`                  |
//! | kill            | `taskkill /PID N /F`                           | `kill -9 N`                            |

pub mod escape;

use serde::Serialize;

use crate::domain::OperatingSystem;

/// What a command should ask the OS for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryIntent {
    ListPorts,
    PortsByNumber(u16),
    ListProcesses,
    ProcessByPid(u32),
    ProcessByName(String),
    CommandLine(u32),
    Kill(u32),
}

/// A shell command line plus the primary tool it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellCommand {
    /// Full text handed to the platform shell.
    pub text: String,
    /// Binary whose absence makes the command impossible.
    pub tool: &'static str,
}

impl ShellCommand {
    pub fn new(text: impl Into<String>, tool: &'static str) -> Self {
        Self {
            text: text.into(),
            tool,
        }
    }
}

impl std::fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Builds platform-specific command lines.
#[derive(Debug, Clone, Copy)]
pub struct CommandBuilder {
    os: OperatingSystem,
}

impl CommandBuilder {
    pub fn new(os: OperatingSystem) -> Self {
        Self { os }
    }

    pub fn os(&self) -> OperatingSystem {
        self.os
    }

    /// Build the command for an intent, escaping every interpolated value.
    pub fn build(&self, intent: &QueryIntent) -> ShellCommand {
        let arg = match intent {
            QueryIntent::ListPorts | QueryIntent::ListProcesses => String::new(),
            QueryIntent::PortsByNumber(port) => self.escape_bare(&port.to_string()),
            QueryIntent::ProcessByPid(pid)
            | QueryIntent::CommandLine(pid)
            | QueryIntent::Kill(pid) => self.escape_bare(&pid.to_string()),
            QueryIntent::ProcessByName(name) => match self.os {
                OperatingSystem::Windows => escape::windows_quoted(name),
                OperatingSystem::MacOs | OperatingSystem::Linux => escape::posix(name),
            },
        };

        render(self.os, IntentKind::of(intent), &arg)
    }

    /// Named command templates for this OS, with `<placeholders>` for arguments.
    pub fn catalog(&self) -> Vec<(&'static str, String)> {
        [
            ("port_query", IntentKind::ListPorts, ""),
            ("port_query_by_number", IntentKind::PortsByNumber, "<port>"),
            ("process_query", IntentKind::ListProcesses, ""),
            ("process_query_by_pid", IntentKind::ProcessByPid, "<pid>"),
            ("process_query_by_name", IntentKind::ProcessByName, "<name>"),
            ("command_line_query", IntentKind::CommandLine, "<pid>"),
            ("kill_process", IntentKind::Kill, "<pid>"),
        ]
        .into_iter()
        .map(|(key, kind, arg)| (key, render(self.os, kind, arg).text))
        .collect()
    }

    /// Binaries that must be on PATH for every intent to work.
    pub fn required_tools(&self) -> &'static [&'static str] {
        match self.os {
            OperatingSystem::Windows => &["netstat", "findstr", "tasklist", "taskkill", "powershell"],
            OperatingSystem::MacOs | OperatingSystem::Linux => &["lsof", "ps", "grep", "kill"],
        }
    }

    fn escape_bare(&self, value: &str) -> String {
        match self.os {
            OperatingSystem::Windows => escape::windows_bare(value),
            OperatingSystem::MacOs | OperatingSystem::Linux => escape::posix(value),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum IntentKind {
    ListPorts,
    PortsByNumber,
    ListProcesses,
    ProcessByPid,
    ProcessByName,
    CommandLine,
    Kill,
}

impl IntentKind {
    fn of(intent: &QueryIntent) -> Self {
        match intent {
            QueryIntent::ListPorts => IntentKind::ListPorts,
            QueryIntent::PortsByNumber(_) => IntentKind::PortsByNumber,
            QueryIntent::ListProcesses => IntentKind::ListProcesses,
            QueryIntent::ProcessByPid(_) => IntentKind::ProcessByPid,
            QueryIntent::ProcessByName(_) => IntentKind::ProcessByName,
            QueryIntent::CommandLine(_) => IntentKind::CommandLine,
            QueryIntent::Kill(_) => IntentKind::Kill,
        }
    }
}

/// Render a command from an already-escaped argument.
fn render(os: OperatingSystem, kind: IntentKind, arg: &str) -> ShellCommand {
    match os {
        OperatingSystem::Windows => match kind {
            IntentKind::ListPorts => ShellCommand::new("netstat -ano", "netstat"),
            IntentKind::PortsByNumber => {
                ShellCommand::new(format!("netstat -ano | findstr :{}", arg), "netstat")
            }
            IntentKind::ListProcesses => ShellCommand::new("tasklist /FO CSV /NH", "tasklist"),
            IntentKind::ProcessByPid => ShellCommand::new(
                format!("tasklist /FI \"PID eq {}\" /FO CSV /NH", arg),
                "tasklist",
            ),
            IntentKind::ProcessByName => ShellCommand::new(
                format!("tasklist /FI \"IMAGENAME eq {}*\" /FO CSV /NH", arg),
                "tasklist",
            ),
            IntentKind::CommandLine => ShellCommand::new(
                format!(
                    "powershell -NoProfile -Command \"Get-WmiObject Win32_Process -Filter 'ProcessId={}' | Select-Object -ExpandProperty CommandLine\"",
                    arg
                ),
                "powershell",
            ),
            IntentKind::Kill => ShellCommand::new(format!("taskkill /PID {} /F", arg), "taskkill"),
        },
        OperatingSystem::MacOs | OperatingSystem::Linux => match kind {
            IntentKind::ListPorts => ShellCommand::new("lsof -i -n -P", "lsof"),
            IntentKind::PortsByNumber => {
                ShellCommand::new(format!("lsof -i :{} -n -P", arg), "lsof")
            }
            IntentKind::ListProcesses => ShellCommand::new("ps aux", "ps"),
            IntentKind::ProcessByPid => {
                ShellCommand::new(format!("ps -p {} -o pid,user,comm,%mem", arg), "ps")
            }
            IntentKind::ProcessByName => ShellCommand::new(
                format!("ps aux | grep -i -e {} | grep -v grep", arg),
                "ps",
            ),
            IntentKind::CommandLine => ShellCommand::new(format!("ps -p {} -o command=", arg), "ps"),
            IntentKind::Kill => ShellCommand::new(format!("kill -9 {}", arg), "kill"),
        },
    }
}
