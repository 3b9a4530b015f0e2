//! Kill command - force-terminate a batch of processes.

use std::process::ExitCode;

use anyhow::Result;
use portscope_core::{KillBatchResult, KillService};

use super::Context;

pub async fn run(ctx: &Context, pids: &[String]) -> Result<ExitCode> {
    let service = KillService::new(ctx.executor.clone(), ctx.os);
    let result = service.kill_selected(pids).await?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    if all_failed(&result) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_result(result: &KillBatchResult) {
    for outcome in &result.results {
        let mark = if outcome.success { "ok" } else { "failed" };
        println!("{:<8} {:<8} {}", mark, outcome.pid, outcome.message);
    }
    if !result.results.is_empty() {
        println!();
    }
    println!("{}", result.message);
}

/// True when PIDs were given and none of them could be killed.
fn all_failed(result: &KillBatchResult) -> bool {
    result.summary.total > 0 && result.summary.success == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use portscope_core::KillOutcome;

    #[test]
    fn test_all_failed() {
        assert!(!all_failed(&KillBatchResult::empty()));

        let partial = KillBatchResult::from_outcomes(vec![
            KillOutcome::succeeded("1234", "Process 1234 terminated"),
            KillOutcome::failed("5", "Cannot kill system process"),
        ]);
        assert!(!all_failed(&partial));

        let failed =
            KillBatchResult::from_outcomes(vec![KillOutcome::failed("abc", "Invalid PID format")]);
        assert!(all_failed(&failed));
    }
}
