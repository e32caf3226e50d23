//! Configuration for the plan module.

use serde::{Deserialize, Serialize};

use super::types::EncoderParams;

/// Encoder choices for streams that have to be re-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Video encoder used when subtitles are burned in.
    #[serde(default = "default_video_encoder")]
    pub video_encoder: String,

    /// Encoder speed/quality preset.
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant Rate Factor for the video encoder.
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// Audio encoder used when the audio track is replaced.
    #[serde(default = "default_audio_encoder")]
    pub audio_encoder: String,
}

fn default_video_encoder() -> String {
    "libx264".to_string()
}

fn default_preset() -> String {
    "medium".to_string()
}

fn default_crf() -> u8 {
    23
}

fn default_audio_encoder() -> String {
    "aac".to_string()
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            video_encoder: default_video_encoder(),
            preset: default_preset(),
            crf: default_crf(),
            audio_encoder: default_audio_encoder(),
        }
    }
}

impl EncodingConfig {
    /// Parameters for the burn-in video encode.
    pub fn video_params(&self) -> EncoderParams {
        EncoderParams {
            encoder: self.video_encoder.clone(),
            preset: Some(self.preset.clone()),
            crf: Some(self.crf),
        }
    }

    /// Parameters for the replacement audio encode.
    pub fn audio_params(&self) -> EncoderParams {
        EncoderParams::named(self.audio_encoder.clone())
    }
}

/// Fixed presentation style applied to burned-in subtitles, overriding
/// whatever styling the source subtitle carries.
///
/// Colours use the ASS `&HAABBGGRR` notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnInStyle {
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Outline thickness in pixels.
    #[serde(default = "default_outline")]
    pub outline: u32,

    #[serde(default = "default_primary_colour")]
    pub primary_colour: String,

    #[serde(default = "default_outline_colour")]
    pub outline_colour: String,
}

fn default_font_size() -> u32 {
    24
}

fn default_outline() -> u32 {
    2
}

fn default_primary_colour() -> String {
    "&H00FFFFFF".to_string()
}

fn default_outline_colour() -> String {
    "&H00000000".to_string()
}

impl Default for BurnInStyle {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            outline: default_outline(),
            primary_colour: default_primary_colour(),
            outline_colour: default_outline_colour(),
        }
    }
}

impl BurnInStyle {
    /// Renders the style as a libass `force_style` value.
    pub fn force_style(&self) -> String {
        format!(
            "FontSize={},Outline={},PrimaryColour={},OutlineColour={}",
            self.font_size, self.outline, self.primary_colour, self.outline_colour
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_encoding() {
        let config = EncodingConfig::default();
        let video = config.video_params();
        assert_eq!(video.encoder, "libx264");
        assert_eq!(video.preset.as_deref(), Some("medium"));
        assert_eq!(video.crf, Some(23));
        assert_eq!(config.audio_params(), EncoderParams::named("aac"));
    }

    #[test]
    fn test_force_style() {
        let style = BurnInStyle::default();
        assert_eq!(
            style.force_style(),
            "FontSize=24,Outline=2,PrimaryColour=&H00FFFFFF,OutlineColour=&H00000000"
        );
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let style: BurnInStyle = toml::from_str("font_size = 32").unwrap();
        assert_eq!(style.font_size, 32);
        assert_eq!(style.outline, 2);
    }
}
