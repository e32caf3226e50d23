//! Derives an execution plan from a composition mode.

use std::path::{Path, PathBuf};

use crate::subtitle::NormalizedSubtitle;

use super::config::{BurnInStyle, EncodingConfig};
use super::error::PlanError;
use super::mode::CompositionMode;
use super::types::{Codec, ExecutionPlan, InputSet, OutputFormat, StreamMap, StreamType};

/// Builds [`ExecutionPlan`]s from a mode, the request inputs and the
/// normalized subtitle.
#[derive(Debug, Clone, Default)]
pub struct PlanBuilder {
    encoding: EncodingConfig,
    style: BurnInStyle,
}

impl PlanBuilder {
    pub fn new(encoding: EncodingConfig, style: BurnInStyle) -> Self {
        Self { encoding, style }
    }

    /// Creates a builder with default encoders and styling.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Builds the plan for `mode`.
    ///
    /// Subtitle modes read the UTF-8 copy from `subtitle`, never the raw
    /// source file named in `inputs`.
    pub fn build(
        &self,
        mode: CompositionMode,
        inputs: &InputSet,
        subtitle: Option<&NormalizedSubtitle>,
        format: OutputFormat,
    ) -> Result<ExecutionPlan, PlanError> {
        let video = inputs.video().to_path_buf();

        let plan = match mode {
            CompositionMode::VideoOnly => ExecutionPlan {
                inputs: vec![video],
                video_codec: Codec::Copy,
                audio_codec: Some(Codec::Copy),
                stream_maps: Vec::new(),
                filter_chain: None,
                output_format: format,
            },
            CompositionMode::VideoPlusAudio => ExecutionPlan {
                inputs: vec![video, Self::require_audio(inputs)?],
                video_codec: Codec::Copy,
                audio_codec: Some(Codec::Reencode(self.encoding.audio_params())),
                stream_maps: Self::audio_replacement_maps(),
                filter_chain: None,
                output_format: format,
            },
            CompositionMode::VideoPlusSubtitle => {
                let subtitle_path = Self::require_subtitle(inputs, subtitle)?;
                ExecutionPlan {
                    filter_chain: Some(self.burn_in_filter(&subtitle_path)),
                    inputs: vec![video, subtitle_path],
                    video_codec: Codec::Reencode(self.encoding.video_params()),
                    audio_codec: Some(Codec::Copy),
                    stream_maps: Vec::new(),
                    output_format: format,
                }
            }
            CompositionMode::VideoPlusAudioPlusSubtitle => {
                let audio = Self::require_audio(inputs)?;
                let subtitle_path = Self::require_subtitle(inputs, subtitle)?;
                ExecutionPlan {
                    filter_chain: Some(self.burn_in_filter(&subtitle_path)),
                    inputs: vec![video, audio, subtitle_path],
                    video_codec: Codec::Reencode(self.encoding.video_params()),
                    audio_codec: Some(Codec::Reencode(self.encoding.audio_params())),
                    stream_maps: Self::audio_replacement_maps(),
                    output_format: format,
                }
            }
        };

        plan.validate()?;
        Ok(plan)
    }

    /// Burn-in filter for the given subtitle file.
    ///
    /// ffmpeg unescapes filter arguments twice: once when splitting the
    /// graph and once when splitting the filter's `key=value` options. The
    /// path is backslash-escaped for the option level and then quoted for
    /// the graph level, so any path survives both passes intact.
    pub fn burn_in_filter(&self, subtitle_path: &Path) -> String {
        let filename = escape_option_value(&subtitle_path.to_string_lossy());
        format!(
            "subtitles={}:force_style='{}'",
            quote_graph_token(&filename),
            self.style.force_style()
        )
    }

    // Video from the first input, audio from the second, whatever streams
    // each file carries. Keeps a stray audio track in the video file out.
    fn audio_replacement_maps() -> Vec<StreamMap> {
        vec![
            StreamMap::new(0, StreamType::Video),
            StreamMap::new(1, StreamType::Audio),
        ]
    }

    fn require_audio(inputs: &InputSet) -> Result<PathBuf, PlanError> {
        inputs
            .audio()
            .map(Path::to_path_buf)
            .ok_or(PlanError::MissingAudio)
    }

    fn require_subtitle(
        inputs: &InputSet,
        subtitle: Option<&NormalizedSubtitle>,
    ) -> Result<PathBuf, PlanError> {
        match (inputs.subtitle(), subtitle) {
            (Some(_), Some(normalized)) => Ok(normalized.utf8_path.clone()),
            _ => Err(PlanError::MissingSubtitle),
        }
    }
}

/// Escapes `\`, `'` and `:` so a filter option parser keeps them literal.
fn escape_option_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | ':') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Wraps a token in single quotes for the filter graph parser.
///
/// Nothing is special inside the quotes; an embedded `'` closes the quote,
/// is emitted escaped, and reopens it.
fn quote_graph_token(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}
