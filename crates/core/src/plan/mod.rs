//! Composition planning.
//!
//! Classifies a request into a [`CompositionMode`] and turns that mode into an
//! [`ExecutionPlan`]: the ordered inputs, codec choices, stream maps and the
//! optional burn-in filter handed to the media tool.
//!
//! # Example
//!
//! ```ignore
//! use composer_core::plan::{CompositionMode, InputSet, OutputFormat, PlanBuilder};
//!
//! let inputs = InputSet::new("/media/clip.mp4").with_audio("/media/voiceover.wav");
//! let mode = CompositionMode::classify(&inputs);
//! let plan = PlanBuilder::with_defaults().build(mode, &inputs, None, OutputFormat::Mp4)?;
//! assert_eq!(plan.stream_maps.len(), 2);
//! ```

mod builder;
mod config;
mod error;
mod mode;
mod types;

pub use builder::PlanBuilder;
pub use config::{BurnInStyle, EncodingConfig};
pub use error::PlanError;
pub use mode::CompositionMode;
pub use types::{
    Codec, EncoderParams, ExecutionPlan, InputSet, OutputFormat, StreamMap, StreamType,
};
