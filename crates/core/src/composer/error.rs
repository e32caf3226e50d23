//! Error types for the composer module.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::plan::PlanError;
use crate::supervisor::SupervisorError;

/// Errors that abort a composition request.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// One of the input files does not exist or is not a regular file.
    #[error("{kind} input not found: {path}")]
    InputNotFound { kind: &'static str, path: PathBuf },

    /// A request-scoped directory could not be created.
    #[error("Failed to prepare directory {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No valid plan could be built.
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// The media tool could not be run.
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    /// The media tool exited non-zero.
    #[error("Media tool failed (exit code {exit_code:?}): {stderr}")]
    ToolFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The media tool ran past its deadline and was killed.
    #[error("Media tool timed out after {after:?} and was killed; the input may be too large to process within the deadline")]
    TimedOut { after: Duration },

    /// The tool reported success without writing the output file.
    #[error("Media tool reported success but wrote no output at {path}")]
    OutputMissing { path: PathBuf },
}

impl ComposeError {
    /// Whether the request failed because of the deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    /// Captured tool diagnostics, when the failure came from the tool.
    pub fn tool_stderr(&self) -> Option<&str> {
        match self {
            Self::ToolFailed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}
