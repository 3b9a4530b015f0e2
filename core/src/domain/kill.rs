//! Batch kill results.

use serde::{Deserialize, Serialize};

/// Message returned when a kill batch is requested with no PIDs.
pub const NO_SELECTION_MESSAGE: &str = "No processes selected for killing";
/// Outcome message for a PID that is not a positive integer.
pub const INVALID_PID_MESSAGE: &str = "Invalid PID format";
/// Outcome message for a PID in the protected low range.
pub const SYSTEM_PROCESS_MESSAGE: &str = "Cannot kill system process";

/// Result of one kill attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillOutcome {
    pub pid: String,
    pub success: bool,
    pub message: String,
}

impl KillOutcome {
    pub fn succeeded(pid: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pid: pid.into(),
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(pid: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pid: pid.into(),
            success: false,
            message: message.into(),
        }
    }
}

/// Counts over a kill batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}

/// Aggregated result of killing a list of PIDs.
///
/// `success` is true when at least one kill succeeded, not when all did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillBatchResult {
    pub success: bool,
    pub results: Vec<KillOutcome>,
    pub summary: KillSummary,
    pub message: String,
}

impl KillBatchResult {
    /// Result for an empty selection.
    pub fn empty() -> Self {
        Self {
            success: false,
            results: Vec::new(),
            summary: KillSummary::default(),
            message: NO_SELECTION_MESSAGE.to_string(),
        }
    }

    /// Aggregate per-PID outcomes, preserving their order.
    pub fn from_outcomes(results: Vec<KillOutcome>) -> Self {
        if results.is_empty() {
            return Self::empty();
        }

        let total = results.len();
        let success = results.iter().filter(|r| r.success).count();
        let failed = total - success;

        let message = if success == 0 {
            format!("Failed to kill {} process(es)", failed)
        } else if failed == 0 {
            format!("Successfully killed {} process(es)", success)
        } else {
            format!(
                "Killed {} of {} process(es); {} failed",
                success, total, failed
            )
        };

        Self {
            success: success > 0,
            results,
            summary: KillSummary {
                total,
                success,
                failed,
            },
            message,
        }
    }

    /// Outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &KillOutcome> {
        self.results.iter().filter(|r| !r.success)
    }
}
