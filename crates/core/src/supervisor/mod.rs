//! Execution supervisor for the external media tool.
//!
//! Turns an [`ExecutionPlan`](crate::plan::ExecutionPlan) into an ffmpeg
//! invocation, runs it under a wall-clock deadline and reports how it ended.
//!
//! # Features
//!
//! - Full capture of standard output and standard error
//! - Deadline enforcement that kills the tool's entire process group
//! - Distinct outcomes for success, tool failure and timeout
//! - Single attempt per call, retries are the caller's decision
//!
//! # Example
//!
//! ```ignore
//! use composer_core::supervisor::{FfmpegRunner, ToolConfig, ToolRunner};
//!
//! let runner = FfmpegRunner::new(ToolConfig::default());
//! runner.validate().await?;
//!
//! let result = runner.execute(&plan, Path::new("/tmp/out.mp4"), Duration::from_secs(300)).await?;
//! if !result.success {
//!     eprintln!("{}", result.stderr);
//! }
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::ToolConfig;
pub use error::SupervisorError;
pub use ffmpeg::FfmpegRunner;
pub use traits::ToolRunner;
pub use types::{ExecutionOutcome, ExecutionResult};
