//! Types for the plan module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::error::PlanError;

/// The source artifacts of one composition request.
///
/// The video is always present; audio and subtitle are independently optional.
/// Fields are private so the set cannot change once a request is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSet {
    video: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audio: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subtitle: Option<PathBuf>,
}

impl InputSet {
    /// Creates an input set holding only the base video.
    pub fn new(video: impl Into<PathBuf>) -> Self {
        Self {
            video: video.into(),
            audio: None,
            subtitle: None,
        }
    }

    /// Adds a replacement audio track.
    pub fn with_audio(mut self, audio: impl Into<PathBuf>) -> Self {
        self.audio = Some(audio.into());
        self
    }

    /// Adds a subtitle track to burn in.
    pub fn with_subtitle(mut self, subtitle: impl Into<PathBuf>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn video(&self) -> &Path {
        &self.video
    }

    pub fn audio(&self) -> Option<&Path> {
        self.audio.as_deref()
    }

    pub fn subtitle(&self) -> Option<&Path> {
        self.subtitle.as_deref()
    }
}

/// Container format of the composed output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// MPEG-4 Part 14 (.mp4)
    #[default]
    Mp4,
    /// QuickTime (.mov)
    Mov,
    /// Audio Video Interleave (.avi)
    Avi,
}

impl OutputFormat {
    /// All supported output formats.
    pub const ALL: [OutputFormat; 3] = [Self::Mp4, Self::Mov, Self::Avi];

    /// Returns the file extension for this container.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mov => "mov",
            Self::Avi => "avi",
        }
    }

    /// Returns the ffmpeg muxer name for this container.
    pub fn muxer(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mov => "mov",
            Self::Avi => "avi",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_start_matches('.').to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extension() == normalized)
            .ok_or_else(|| PlanError::UnsupportedFormat {
                format: s.to_string(),
            })
    }
}

/// Kind of elementary stream selected by a stream map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamType {
    Video,
    Audio,
}

impl StreamType {
    /// ffmpeg stream specifier letter.
    pub fn specifier(&self) -> &'static str {
        match self {
            Self::Video => "v",
            Self::Audio => "a",
        }
    }
}

/// Selects which input supplies an output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamMap {
    /// Index into [`ExecutionPlan::inputs`].
    pub input_index: usize,
    /// Stream kind taken from that input.
    pub stream: StreamType,
}

impl StreamMap {
    pub fn new(input_index: usize, stream: StreamType) -> Self {
        Self {
            input_index,
            stream,
        }
    }

    /// Renders the map as an ffmpeg `-map` value, always picking the first
    /// stream of the requested kind.
    pub fn to_arg(&self) -> String {
        format!("{}:{}:0", self.input_index, self.stream.specifier())
    }
}

/// Encoder selection plus tuning parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderParams {
    /// ffmpeg encoder name (e.g. `libx264`, `aac`).
    pub encoder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    /// Constant Rate Factor (lower = better, 0-51 for x264/x265).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crf: Option<u8>,
}

impl EncoderParams {
    /// An encoder with no tuning parameters.
    pub fn named(encoder: impl Into<String>) -> Self {
        Self {
            encoder: encoder.into(),
            preset: None,
            crf: None,
        }
    }
}

/// Codec choice for one stream kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Codec {
    /// Pass the stream through untouched.
    Copy,
    /// Decode and re-encode the stream.
    Reencode(EncoderParams),
}

impl Codec {
    pub fn is_copy(&self) -> bool {
        matches!(self, Self::Copy)
    }

    /// Returns the ffmpeg codec name.
    pub fn ffmpeg_codec(&self) -> &str {
        match self {
            Self::Copy => "copy",
            Self::Reencode(params) => &params.encoder,
        }
    }
}

/// Everything needed to invoke the media tool for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// Input files, in declaration order.
    pub inputs: Vec<PathBuf>,
    pub video_codec: Codec,
    /// `None` leaves audio codec selection to the tool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<Codec>,
    /// Explicit stream selection. Empty means the tool's default selection.
    #[serde(default)]
    pub stream_maps: Vec<StreamMap>,
    /// Video filter expression used for subtitle burn-in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_chain: Option<String>,
    pub output_format: OutputFormat,
}

impl ExecutionPlan {
    /// Checks the structural invariants of the plan.
    ///
    /// - at least one input is declared
    /// - every stream map points at a declared input
    /// - a filter chain is only combined with a re-encoded video stream
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.inputs.is_empty() {
            return Err(PlanError::invalid_plan("plan declares no inputs"));
        }

        if let Some(map) = self
            .stream_maps
            .iter()
            .find(|map| map.input_index >= self.inputs.len())
        {
            return Err(PlanError::invalid_plan(format!(
                "stream map {} references input {} but only {} inputs are declared",
                map.to_arg(),
                map.input_index,
                self.inputs.len()
            )));
        }

        if self.filter_chain.is_some() && self.video_codec.is_copy() {
            return Err(PlanError::invalid_plan(
                "a video filter requires re-encoding the video stream",
            ));
        }

        Ok(())
    }

    /// Whether the plan burns text into the video.
    pub fn burns_subtitles(&self) -> bool {
        self.filter_chain.is_some()
    }
}
