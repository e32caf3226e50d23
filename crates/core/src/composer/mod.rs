//! Composition requests.
//!
//! The [`Composer`] ties the other modules together for one request: it checks
//! the inputs, allocates request-scoped directories, normalizes the subtitle,
//! classifies the inputs, builds the plan, runs it under the configured
//! deadline and maps the outcome to a [`ComposeError`] when it fails.
//!
//! # Example
//!
//! ```ignore
//! use composer_core::{Composer, ComposeRequest, Config, InputSet, OutputFormat};
//!
//! let composer = Composer::from_config(Config::default());
//! let inputs = InputSet::new("/media/clip.mp4").with_subtitle("/media/clip.srt");
//!
//! let output = composer.compose(ComposeRequest::new(inputs, OutputFormat::Mp4)).await?;
//! println!("Wrote {}", output.output_path.display());
//! ```

mod composer;
mod config;
mod error;
mod types;

pub use composer::Composer;
pub use config::WorkspaceConfig;
pub use error::ComposeError;
pub use types::{ComposeOutput, ComposeRequest};
