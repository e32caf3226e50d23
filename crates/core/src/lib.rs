//! Composes a final media file from a base video, an optional replacement
//! audio track and an optional subtitle track burned into the picture.
//!
//! The crate decides *how* to compose; the heavy lifting is delegated to an
//! external ffmpeg binary.
//!
//! - [`subtitle`] re-encodes subtitle text to UTF-8
//! - [`plan`] classifies the inputs and builds the ffmpeg execution plan
//! - [`supervisor`] runs the plan under a deadline
//! - [`composer`] drives the above for one request

pub mod composer;
pub mod config;
pub mod plan;
pub mod subtitle;
pub mod supervisor;
pub mod testing;

pub use composer::{ComposeError, ComposeOutput, ComposeRequest, Composer, WorkspaceConfig};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError,
};
pub use plan::{
    BurnInStyle, Codec, CompositionMode, EncoderParams, EncodingConfig, ExecutionPlan, InputSet,
    OutputFormat, PlanBuilder, PlanError, StreamMap, StreamType,
};
pub use subtitle::{ChardetngDetector, CharsetDetector, NormalizedSubtitle, SubtitleNormalizer};
pub use supervisor::{
    ExecutionOutcome, ExecutionResult, FfmpegRunner, SupervisorError, ToolConfig, ToolRunner,
};
