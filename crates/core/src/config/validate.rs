use super::{
    types::{Config, LOG_LEVELS},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - ffmpeg.path is not empty
/// - ffmpeg.timeout_secs is not 0
/// - logging.level is a known level
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.ffmpeg.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "ffmpeg.path cannot be empty".to_string(),
        ));
    }

    if config.ffmpeg.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "ffmpeg.timeout_secs cannot be 0".to_string(),
        ));
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "logging.level must be one of {}, got '{}'",
            LOG_LEVELS.join(", "),
            config.logging.level
        )));
    }

    Ok(())
}
