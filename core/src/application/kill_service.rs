//! Batch process termination.

use tracing::{debug, warn};

use crate::command::{CommandBuilder, QueryIntent};
use crate::domain::{
    is_system_process, validate_pid, KillBatchResult, KillOutcome, OperatingSystem,
    INVALID_PID_MESSAGE, SYSTEM_PROCESS_MESSAGE,
};
use crate::error::{Error, Result};
use crate::ports::{CommandExecutor, OutputMode};

/// Application service that force-kills a selection of PIDs.
///
/// Each PID gets its own outcome. A PID that is invalid, protected, or
/// whose kill command fails is recorded as a failure and the batch moves
/// on; only a missing kill tool or a shell that cannot start aborts it.
pub struct KillService<E: CommandExecutor> {
    executor: E,
    builder: CommandBuilder,
}

impl<E: CommandExecutor> KillService<E> {
    pub fn new(executor: E, os: OperatingSystem) -> Self {
        Self {
            executor,
            builder: CommandBuilder::new(os),
        }
    }

    /// Kill every selected PID, in order.
    pub async fn kill_selected<S: AsRef<str>>(&self, pids: &[S]) -> Result<KillBatchResult> {
        if pids.is_empty() {
            return Ok(KillBatchResult::empty());
        }

        let mut outcomes = Vec::with_capacity(pids.len());
        for pid in pids {
            outcomes.push(self.kill_one(pid.as_ref()).await?);
        }

        let result = KillBatchResult::from_outcomes(outcomes);
        debug!(
            total = result.summary.total,
            success = result.summary.success,
            failed = result.summary.failed,
            "Kill batch finished"
        );
        Ok(result)
    }

    async fn kill_one(&self, input: &str) -> Result<KillOutcome> {
        let label = input.trim();

        let Ok(pid) = validate_pid(label) else {
            warn!(pid = %label, "Refusing to kill invalid PID");
            return Ok(KillOutcome::failed(label, INVALID_PID_MESSAGE));
        };

        if is_system_process(pid) {
            warn!(pid = pid, "Refusing to kill system process");
            return Ok(KillOutcome::failed(label, SYSTEM_PROCESS_MESSAGE));
        }

        let command = self.builder.build(&QueryIntent::Kill(pid));
        let output = match self.executor.run(&command, OutputMode::StderrOnly).await {
            Ok(output) => output,
            Err(e @ Error::Timeout { .. }) => {
                warn!(pid = pid, error = %e, "Kill command timed out");
                return Ok(KillOutcome::failed(label, e.to_string()));
            }
            Err(e) => return Err(e),
        };

        if output.success() {
            debug!(pid = pid, "Process terminated");
            return Ok(KillOutcome::succeeded(label, format!("Process {} terminated", pid)));
        }

        let diagnostic = output.diagnostic();
        let message = if diagnostic.is_empty() {
            format!("kill exited with status {}", output.exit_code)
        } else {
            diagnostic
        };
        warn!(pid = pid, exit_code = output.exit_code, message = %message, "Failed to kill process");
        Ok(KillOutcome::failed(label, message))
    }
}
