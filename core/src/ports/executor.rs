//! Command executor port (interface).

use std::sync::Arc;

use serde::Serialize;

use crate::command::ShellCommand;
use crate::error::Result;

/// How stderr is reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// stdout lines followed by stderr lines.
    #[default]
    Merged,
    /// stdout lines only; stderr is kept separately as the diagnostic text.
    StderrOnly,
}

/// Captured result of one command run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    /// Output lines with trailing line endings removed.
    pub lines: Vec<String>,
    /// stderr text when run in [`OutputMode::StderrOnly`].
    pub stderr: String,
    /// Process exit code (`-1` if terminated by a signal).
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn new(lines: Vec<String>, exit_code: i32) -> Self {
        Self {
            lines,
            stderr: String::new(),
            exit_code,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Best available explanation of a failed run: stderr, else output.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        self.lines.join("\n").trim().to_string()
    }
}

/// Port for running shell commands.
///
/// A nonzero exit code is reported in [`CommandOutput::exit_code`], never as
/// an error. Errors are reserved for commands that could not run at all:
/// missing tools, spawn failures and timeouts.
pub trait CommandExecutor: Send + Sync {
    fn run(
        &self,
        command: &ShellCommand,
        mode: OutputMode,
    ) -> impl std::future::Future<Output = Result<CommandOutput>> + Send;
}

impl<E: CommandExecutor> CommandExecutor for Arc<E> {
    fn run(
        &self,
        command: &ShellCommand,
        mode: OutputMode,
    ) -> impl std::future::Future<Output = Result<CommandOutput>> + Send {
        (**self).run(command, mode)
    }
}
