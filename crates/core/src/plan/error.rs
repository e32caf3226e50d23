//! Error types for the plan module.

use thiserror::Error;

/// Errors raised while building or validating an execution plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// The composition mode needs an audio input the request does not carry.
    #[error("Composition mode requires an audio input but none was provided")]
    MissingAudio,

    /// The composition mode needs a subtitle input the request does not carry.
    #[error("Composition mode requires a subtitle input but none was provided")]
    MissingSubtitle,

    /// Requested output format is not one of the supported containers.
    #[error("Unsupported output format: {format}")]
    UnsupportedFormat { format: String },

    /// The plan breaks one of its structural invariants.
    #[error("Invalid execution plan: {reason}")]
    InvalidPlan { reason: String },
}

impl PlanError {
    /// Creates a new invalid plan error.
    pub fn invalid_plan(reason: impl Into<String>) -> Self {
        Self::InvalidPlan {
            reason: reason.into(),
        }
    }
}
