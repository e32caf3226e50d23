use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Tool path is not empty and the deadline is not 0
/// - Encoder names are not empty and CRF is within 0-51
/// - Burn-in font size is not 0 and colours contain no quote
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Tool validation
    if config.tool.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "tool.ffmpeg_path cannot be empty".to_string(),
        ));
    }

    if config.tool.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "tool.timeout_secs cannot be 0".to_string(),
        ));
    }

    // Encoding validation
    if config.encoding.video_encoder.trim().is_empty()
        || config.encoding.audio_encoder.trim().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "encoding.video_encoder and encoding.audio_encoder cannot be empty".to_string(),
        ));
    }

    if config.encoding.crf > 51 {
        return Err(ConfigError::ValidationError(format!(
            "encoding.crf must be between 0 and 51, got {}",
            config.encoding.crf
        )));
    }

    // Burn-in validation; the style is embedded in a quoted filter argument
    if config.burn_in.font_size == 0 {
        return Err(ConfigError::ValidationError(
            "burn_in.font_size cannot be 0".to_string(),
        ));
    }

    for (key, value) in [
        ("burn_in.primary_colour", &config.burn_in.primary_colour),
        ("burn_in.outline_colour", &config.burn_in.outline_colour),
    ] {
        if value.contains('\'') {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot contain a single quote",
                key
            )));
        }
    }

    Ok(())
}
