//! Shell command executor backed by `tokio::process`.
//!
//! Commands run through `sh -c` on macOS/Linux and `cmd /C` on Windows so
//! that pipelines such as `netstat -ano | findstr :80` work unchanged.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::command::ShellCommand;
use crate::config::Config;
use crate::domain::OperatingSystem;
use crate::error::{Error, Result};
use crate::ports::{CommandExecutor, CommandOutput, OutputMode};

/// Default time limit for one command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of commands allowed to run at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Exit code `sh` uses for "command not found".
const POSIX_NOT_FOUND: i32 = 127;
/// Exit code `cmd.exe` uses for "is not recognized as a command".
const CMD_NOT_FOUND: i32 = 9009;

/// Runs shell commands with a timeout and a bound on concurrent children.
pub struct ShellExecutor {
    os: OperatingSystem,
    timeout: Duration,
    permits: Semaphore,
}

impl ShellExecutor {
    /// Create an executor for the given OS with default limits.
    pub fn new(os: OperatingSystem) -> Self {
        Self {
            os,
            timeout: DEFAULT_COMMAND_TIMEOUT,
            permits: Semaphore::new(DEFAULT_MAX_CONCURRENT),
        }
    }

    /// Create an executor using the limits from a configuration.
    pub fn from_config(os: OperatingSystem, config: &Config) -> Self {
        Self::new(os)
            .with_timeout(Duration::from_secs(config.command_timeout_secs.max(1)))
            .with_max_concurrent(config.max_concurrent_commands)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.permits = Semaphore::new(max.max(1));
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn shell_name(&self) -> &'static str {
        match self.os {
            OperatingSystem::Windows => "cmd",
            OperatingSystem::MacOs | OperatingSystem::Linux => "sh",
        }
    }

    fn shell_command(&self, text: &str) -> Command {
        let mut cmd = Command::new(self.shell_name());
        match self.os {
            OperatingSystem::Windows => {
                cmd.arg("/C");
                push_raw_arg(&mut cmd, text);
            }
            OperatingSystem::MacOs | OperatingSystem::Linux => {
                cmd.arg("-c").arg(text);
            }
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new(OperatingSystem::detect())
    }
}

impl CommandExecutor for ShellExecutor {
    async fn run(&self, command: &ShellCommand, mode: OutputMode) -> Result<CommandOutput> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| Error::CommandFailed(format!("executor unavailable: {}", e)))?;

        debug!(command = %command.text, "Running system command");

        let child = self.shell_command(&command.text).spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ToolNotFound(self.shell_name().to_string())
            } else {
                Error::CommandFailed(format!("{}: {}", command.text, e))
            }
        })?;

        // Dropping the child on timeout kills it (kill_on_drop).
        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(Error::CommandFailed(format!("{}: {}", command.text, e))),
            Err(_) => {
                warn!(command = %command.text, timeout_secs = self.timeout.as_secs(), "Command timed out");
                return Err(Error::Timeout {
                    command: command.text.clone(),
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if is_missing_tool(command.tool, exit_code, &stderr) {
            warn!(tool = command.tool, "Required system tool not found");
            return Err(Error::ToolNotFound(command.tool.to_string()));
        }

        debug!(command = %command.text, exit_code, "Command finished");

        let mut lines: Vec<String> = stdout.lines().map(str::to_string).collect();
        let result = match mode {
            OutputMode::Merged => {
                lines.extend(stderr.lines().map(str::to_string));
                CommandOutput::new(lines, exit_code)
            }
            OutputMode::StderrOnly => CommandOutput {
                lines,
                stderr: stderr.into_owned(),
                exit_code,
            },
        };

        Ok(result)
    }
}

#[cfg(windows)]
fn push_raw_arg(cmd: &mut Command, text: &str) {
    cmd.raw_arg(text);
}

#[cfg(not(windows))]
fn push_raw_arg(cmd: &mut Command, text: &str) {
    cmd.arg(text);
}

/// Recognize the shell's report that the command's tool does not exist.
fn is_missing_tool(tool: &str, exit_code: i32, stderr: &str) -> bool {
    if exit_code == POSIX_NOT_FOUND || exit_code == CMD_NOT_FOUND {
        return true;
    }

    let posix = [
        format!("{}: not found", tool),
        format!("{}: command not found", tool),
    ];
    let windows = format!("'{}' is not recognized", tool);

    stderr.lines().any(|line| {
        posix.iter().any(|pattern| line.contains(pattern.as_str())) || line.contains(&windows)
    })
}

/// Find an executable on PATH.
///
/// On Windows every extension in `PATHEXT` is tried as well.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    let extensions = executable_extensions();

    env::split_paths(&path).find_map(|dir| probe(&dir, name, &extensions))
}

fn probe(dir: &Path, name: &str, extensions: &[String]) -> Option<PathBuf> {
    let candidate = dir.join(name);
    if candidate.is_file() {
        return Some(candidate);
    }

    extensions
        .iter()
        .map(|ext| dir.join(format!("{}{}", name, ext)))
        .find(|path| path.is_file())
}

fn executable_extensions() -> Vec<String> {
    if !cfg!(windows) {
        return Vec::new();
    }

    env::var("PATHEXT")
        .unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string())
        .split(';')
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_detection() {
        assert!(is_missing_tool("lsof", 127, ""));
        assert!(is_missing_tool("tasklist", 9009, ""));
        assert!(is_missing_tool("ps", 1, "sh: 1: ps: not found\n"));
        assert!(is_missing_tool("lsof", 1, "bash: lsof: command not found"));
        assert!(is_missing_tool(
            "netstat",
            1,
            "'netstat' is not recognized as an internal or external command,"
        ));

        assert!(!is_missing_tool("kill", 1, "kill: (5678) - No such process"));
        assert!(!is_missing_tool("lsof", 0, ""));
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            command_timeout_secs: 9,
            ..Config::default()
        };
        let executor = ShellExecutor::from_config(OperatingSystem::Linux, &config);
        assert_eq!(executor.timeout(), Duration::from_secs(9));
    }

    #[test]
    fn test_find_executable_missing() {
        assert!(find_executable("definitely-not-a-real-tool-5f3a").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_find_executable_sh() {
        assert!(find_executable("sh").is_some());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captures_output_and_exit_code() {
        let executor = ShellExecutor::new(OperatingSystem::detect());
        let command = ShellCommand::new("echo hello; echo oops >&2; exit 3", "echo");

        let merged = executor.run(&command, OutputMode::Merged).await.unwrap();
        assert_eq!(merged.lines, vec!["hello".to_string(), "oops".to_string()]);
        assert_eq!(merged.exit_code, 3);

        let split = executor.run(&command, OutputMode::StderrOnly).await.unwrap();
        assert_eq!(split.lines, vec!["hello".to_string()]);
        assert_eq!(split.stderr.trim(), "oops");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_reports_missing_tool() {
        let executor = ShellExecutor::new(OperatingSystem::detect());
        let command = ShellCommand::new("definitely-not-a-real-tool-5f3a --version", "definitely-not-a-real-tool-5f3a");

        let err = executor.run(&command, OutputMode::Merged).await.unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(ref tool) if tool == "definitely-not-a-real-tool-5f3a"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_times_out() {
        let executor =
            ShellExecutor::new(OperatingSystem::detect()).with_timeout(Duration::from_millis(200));
        let command = ShellCommand::new("sleep 5", "sleep");

        let err = executor.run(&command, OutputMode::Merged).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
        assert!(err.is_system_command());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_max_concurrent_serializes_commands() {
        let executor = ShellExecutor::new(OperatingSystem::detect()).with_max_concurrent(1);
        let command = ShellCommand::new("sleep 0.3", "sleep");

        let started = std::time::Instant::now();
        let (a, b, c) = tokio::join!(
            executor.run(&command, OutputMode::Merged),
            executor.run(&command, OutputMode::Merged),
            executor.run(&command, OutputMode::Merged),
        );
        let elapsed = started.elapsed();

        assert!(a.unwrap().success() && b.unwrap().success() && c.unwrap().success());
        assert!(elapsed >= Duration::from_millis(900), "ran in {:?}", elapsed);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_permits_allow_overlap() {
        let executor = ShellExecutor::new(OperatingSystem::detect()).with_max_concurrent(3);
        let command = ShellCommand::new("sleep 0.5", "sleep");

        let started = std::time::Instant::now();
        let (a, b, c) = tokio::join!(
            executor.run(&command, OutputMode::Merged),
            executor.run(&command, OutputMode::Merged),
            executor.run(&command, OutputMode::Merged),
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert!(started.elapsed() < Duration::from_millis(1500));
    }
}
