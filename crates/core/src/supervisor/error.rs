//! Error types for the supervisor module.

use std::path::PathBuf;
use thiserror::Error;

use crate::plan::PlanError;

/// Errors that prevent the media tool from being run at all.
///
/// A tool that runs and fails, or runs past its deadline, is not an error at
/// this level; see [`ExecutionOutcome`](super::ExecutionOutcome).
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// The plan breaks its own invariants.
    #[error("Refusing to run invalid plan: {0}")]
    InvalidPlan(#[from] PlanError),

    /// I/O error while spawning or waiting on the tool.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
