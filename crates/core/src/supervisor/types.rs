//! Types for the supervisor module.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a single tool invocation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// The tool exited with status zero.
    Completed,
    /// The tool exited non-zero or was killed by a signal.
    ToolFailed {
        exit_code: Option<i32>,
        stderr: String,
    },
    /// The deadline fired and the tool's process group was killed.
    TimedOut { after: Duration },
}

/// Captured result of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    /// Full standard output.
    pub stdout: String,
    /// Full standard error.
    pub stderr: String,
    pub outcome: ExecutionOutcome,
    /// Wall-clock time spent supervising the tool.
    pub elapsed: Duration,
}

impl ExecutionResult {
    /// Builds a result whose `success` flag agrees with `outcome`.
    pub fn new(outcome: ExecutionOutcome, stdout: String, stderr: String, elapsed: Duration) -> Self {
        Self {
            success: matches!(outcome, ExecutionOutcome::Completed),
            stdout,
            stderr,
            outcome,
            elapsed,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.outcome, ExecutionOutcome::TimedOut { .. })
    }
}
