//! Mock runner for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::plan::ExecutionPlan;
use crate::supervisor::{ExecutionOutcome, ExecutionResult, SupervisorError, ToolRunner};

/// A recorded invocation for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRun {
    /// The plan that was submitted.
    pub plan: ExecutionPlan,
    pub output: PathBuf,
    pub deadline: Duration,
}

/// Mock implementation of the ToolRunner trait.
///
/// Provides controllable behavior for testing:
/// - Track submitted plans for assertions
/// - Simulate completion, tool failure or timeout
/// - Optionally skip writing the output file
///
/// # Example
///
/// ```rust,ignore
/// use composer_core::testing::MockRunner;
///
/// let runner = MockRunner::new();
/// runner.set_next_outcome(ExecutionOutcome::TimedOut { after: Duration::from_secs(1) }).await;
///
/// let composer = Composer::new(config, runner.clone());
/// assert!(composer.compose(request).await.unwrap_err().is_timeout());
/// assert_eq!(runner.run_count().await, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockRunner {
    runs: Arc<RwLock<Vec<RecordedRun>>>,
    /// Outcome of the next execution; `Completed` once consumed.
    next_outcome: Arc<RwLock<Option<ExecutionOutcome>>>,
    /// If set, the next execution fails with this error.
    next_error: Arc<RwLock<Option<SupervisorError>>>,
    /// Whether a completed run writes a placeholder output file.
    write_output: Arc<RwLock<bool>>,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRunner {
    /// Create a new mock runner.
    pub fn new() -> Self {
        Self {
            runs: Arc::new(RwLock::new(Vec::new())),
            next_outcome: Arc::new(RwLock::new(None)),
            next_error: Arc::new(RwLock::new(None)),
            write_output: Arc::new(RwLock::new(true)),
        }
    }

    /// Get all recorded runs.
    pub async fn recorded_runs(&self) -> Vec<RecordedRun> {
        self.runs.read().await.clone()
    }

    /// Get the number of runs performed.
    pub async fn run_count(&self) -> usize {
        self.runs.read().await.len()
    }

    /// Configure how the next run ends.
    pub async fn set_next_outcome(&self, outcome: ExecutionOutcome) {
        *self.next_outcome.write().await = Some(outcome);
    }

    /// Configure the next run to fail before the tool starts.
    pub async fn set_next_error(&self, error: SupervisorError) {
        *self.next_error.write().await = Some(error);
    }

    /// Enable or disable writing the output file on completion.
    pub async fn set_write_output(&self, write: bool) {
        *self.write_output.write().await = write;
    }
}

#[async_trait]
impl ToolRunner for MockRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn execute(
        &self,
        plan: &ExecutionPlan,
        output: &Path,
        deadline: Duration,
    ) -> Result<ExecutionResult, SupervisorError> {
        plan.validate()?;

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        self.runs.write().await.push(RecordedRun {
            plan: plan.clone(),
            output: output.to_path_buf(),
            deadline,
        });

        let outcome = self
            .next_outcome
            .write()
            .await
            .take()
            .unwrap_or(ExecutionOutcome::Completed);

        if outcome == ExecutionOutcome::Completed && *self.write_output.read().await {
            tokio::fs::write(output, b"mock media").await?;
        }

        let stderr = match &outcome {
            ExecutionOutcome::ToolFailed { stderr, .. } => stderr.clone(),
            _ => String::new(),
        };

        Ok(ExecutionResult::new(
            outcome,
            String::new(),
            stderr,
            Duration::from_millis(1),
        ))
    }

    async fn validate(&self) -> Result<(), SupervisorError> {
        Ok(())
    }
}
