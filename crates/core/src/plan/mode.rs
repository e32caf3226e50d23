//! Classification of a request into one of the fixed composition modes.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::InputSet;

/// Which optional inputs accompany the base video.
///
/// Every `(audio, subtitle)` presence combination maps to exactly one variant.
/// Consumers match on it exhaustively, so a new optional input has to be
/// threaded through every planner before the crate compiles again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionMode {
    /// Container remux of the video file alone.
    VideoOnly,
    /// The video's audio track is replaced by a separate audio file.
    VideoPlusAudio,
    /// Subtitles are burned into the video, original audio kept.
    VideoPlusSubtitle,
    /// Audio replacement combined with subtitle burn-in.
    VideoPlusAudioPlusSubtitle,
}

impl CompositionMode {
    /// Derives the mode from which optional inputs are present.
    pub fn classify(inputs: &InputSet) -> Self {
        Self::from_presence(inputs.audio().is_some(), inputs.subtitle().is_some())
    }

    /// Maps the two presence bits to a mode.
    pub fn from_presence(has_audio: bool, has_subtitle: bool) -> Self {
        match (has_audio, has_subtitle) {
            (false, false) => Self::VideoOnly,
            (true, false) => Self::VideoPlusAudio,
            (false, true) => Self::VideoPlusSubtitle,
            (true, true) => Self::VideoPlusAudioPlusSubtitle,
        }
    }

    /// Whether this mode replaces the audio track.
    pub fn has_audio(&self) -> bool {
        matches!(self, Self::VideoPlusAudio | Self::VideoPlusAudioPlusSubtitle)
    }

    /// Whether this mode burns subtitles into the video.
    pub fn has_subtitle(&self) -> bool {
        matches!(
            self,
            Self::VideoPlusSubtitle | Self::VideoPlusAudioPlusSubtitle
        )
    }

    /// Short identifier used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VideoOnly => "video_only",
            Self::VideoPlusAudio => "video_plus_audio",
            Self::VideoPlusSubtitle => "video_plus_subtitle",
            Self::VideoPlusAudioPlusSubtitle => "video_plus_audio_plus_subtitle",
        }
    }
}

impl fmt::Display for CompositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
