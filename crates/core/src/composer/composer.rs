//! Request orchestration: normalize, classify, plan, execute.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::plan::{CompositionMode, InputSet, PlanBuilder};
use crate::subtitle::{CharsetDetector, SubtitleNormalizer};
use crate::supervisor::{ExecutionOutcome, FfmpegRunner, ToolRunner};

use super::error::ComposeError;
use super::types::{ComposeOutput, ComposeRequest};

/// Base name of the composed file inside the request output directory.
const OUTPUT_STEM: &str = "output";

/// Runs composition requests end to end.
///
/// Holds no per-request state; concurrent calls only share configuration and
/// write below their own request-id directories.
pub struct Composer<R: ToolRunner> {
    config: Config,
    runner: R,
    normalizer: SubtitleNormalizer,
    planner: PlanBuilder,
}

impl Composer<FfmpegRunner> {
    /// Creates a composer that drives ffmpeg as configured.
    pub fn from_config(config: Config) -> Self {
        let runner = FfmpegRunner::new(config.tool.clone());
        Self::new(config, runner)
    }
}

impl<R: ToolRunner> Composer<R> {
    pub fn new(config: Config, runner: R) -> Self {
        let planner = PlanBuilder::new(config.encoding.clone(), config.burn_in.clone());
        Self {
            config,
            runner,
            normalizer: SubtitleNormalizer::default(),
            planner,
        }
    }

    /// Replaces the charset detector used for subtitles.
    pub fn with_detector(mut self, detector: impl CharsetDetector + 'static) -> Self {
        self.normalizer = SubtitleNormalizer::new(detector);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Deterministic output location for a request.
    pub fn output_path(&self, request: &ComposeRequest) -> PathBuf {
        self.config
            .workspace
            .output_dir
            .join(request.id.to_string())
            .join(format!("{}.{}", OUTPUT_STEM, request.format.extension()))
    }

    /// Scratch directory for a request.
    pub fn work_dir(&self, request: &ComposeRequest) -> PathBuf {
        self.config.workspace.temp_dir.join(request.id.to_string())
    }

    /// Composes the request's inputs into a single output file.
    ///
    /// Runs the tool exactly once. Only subtitle normalization problems are
    /// recovered from; everything else aborts the request.
    pub async fn compose(&self, request: ComposeRequest) -> Result<ComposeOutput, ComposeError> {
        check_inputs(&request.inputs).await?;

        let work_dir = self.work_dir(&request);
        let output_path = self.output_path(&request);
        create_dir(&work_dir).await?;
        if let Some(parent) = output_path.parent() {
            create_dir(parent).await?;
        }

        let result = self.run(&request, &work_dir, &output_path).await;

        if !self.config.workspace.keep_temp {
            remove_dir(&request, &work_dir).await;
        }
        // A failed request never hands its output path to the caller
        if result.is_err() {
            if let Some(output_dir) = output_path.parent() {
                remove_dir(&request, output_dir).await;
            }
        }

        result
    }

    async fn run(
        &self,
        request: &ComposeRequest,
        work_dir: &Path,
        output_path: &Path,
    ) -> Result<ComposeOutput, ComposeError> {
        let subtitle = match request.inputs.subtitle() {
            Some(source) => Some(self.normalizer.normalize(source, work_dir).await),
            None => None,
        };

        let mode = CompositionMode::classify(&request.inputs);
        info!(
            request_id = %request.id,
            mode = %mode,
            format = %request.format,
            "Composing media"
        );

        let plan = self
            .planner
            .build(mode, &request.inputs, subtitle.as_ref(), request.format)?;

        let result = self
            .runner
            .execute(&plan, output_path, self.config.tool.timeout())
            .await?;

        match &result.outcome {
            ExecutionOutcome::Completed => {}
            ExecutionOutcome::ToolFailed { exit_code, stderr } => {
                return Err(ComposeError::ToolFailed {
                    exit_code: *exit_code,
                    stderr: stderr.clone(),
                });
            }
            ExecutionOutcome::TimedOut { after } => {
                return Err(ComposeError::TimedOut { after: *after });
            }
        }

        if !tokio::fs::try_exists(output_path).await.unwrap_or(false) {
            return Err(ComposeError::OutputMissing {
                path: output_path.to_path_buf(),
            });
        }

        info!(
            request_id = %request.id,
            output = %output_path.display(),
            "Composition finished in {} ms",
            result.elapsed.as_millis()
        );

        Ok(ComposeOutput {
            request_id: request.id,
            output_path: output_path.to_path_buf(),
            mode,
            subtitle_encoding: subtitle.map(|s| s.encoding),
            result,
        })
    }
}

async fn check_inputs(inputs: &InputSet) -> Result<(), ComposeError> {
    let named = [
        ("video", Some(inputs.video())),
        ("audio", inputs.audio()),
        ("subtitle", inputs.subtitle()),
    ];

    for (kind, path) in named {
        let Some(path) = path else { continue };
        let is_file = tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(ComposeError::InputNotFound {
                kind,
                path: path.to_path_buf(),
            });
        }
    }

    Ok(())
}

async fn remove_dir(request: &ComposeRequest, path: &Path) {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            request_id = %request.id,
            "Failed to remove {}: {}",
            path.display(),
            e
        ),
    }
}

async fn create_dir(path: &Path) -> Result<(), ComposeError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| ComposeError::Workspace {
            path: path.to_path_buf(),
            source,
        })
}
