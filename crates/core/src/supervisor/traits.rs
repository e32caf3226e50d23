//! Trait definitions for the supervisor module.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::plan::ExecutionPlan;

use super::error::SupervisorError;
use super::types::ExecutionResult;

/// Runs an [`ExecutionPlan`] through the external media tool.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Runs the plan once, writing to `output`, and waits at most `deadline`.
    ///
    /// Tool failure and deadline expiry are reported through the returned
    /// [`ExecutionResult`]; `Err` means the tool could not be run at all.
    /// Implementations never retry.
    async fn execute(
        &self,
        plan: &ExecutionPlan,
        output: &Path,
        deadline: Duration,
    ) -> Result<ExecutionResult, SupervisorError>;

    /// Validates that the runner is properly configured and ready.
    async fn validate(&self) -> Result<(), SupervisorError>;
}
