use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of environment variables overriding the file, e.g.
/// `FFCONVERT_FFMPEG__TIMEOUT_SECS=60`.
const ENV_PREFIX: &str = "FFCONVERT_";

fn base() -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(base().merge(Toml::file(path)))
}

/// Like [`load_config`], but a missing file only means defaults plus
/// environment. With no path at all the environment alone applies.
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) if path.exists() => load_config(path),
        _ => extract(base()),
    }
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[ffmpeg]
path = "/usr/local/bin/ffmpeg"
timeout_secs = 600

[progress]
min_interval_ms = 1000
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.ffmpeg.path, PathBuf::from("/usr/local/bin/ffmpeg"));
        assert_eq!(config.ffmpeg.timeout_secs, 600);
        assert_eq!(config.progress.min_interval_ms, 1000);
        assert!(config.progress.enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_config_from_str_empty() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_from_str_wrong_type() {
        let toml = r#"
[ffmpeg]
timeout_secs = "soon"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/ffconvert.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[ffmpeg]
path = "/opt/ffmpeg/ffmpeg"
extra_args = ["-loglevel info"]

[logging]
level = "debug"
"#
        )
        .unwrap();

        // Jail serializes access to the process environment.
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            let config = load_config(temp_file.path()).unwrap();
            assert_eq!(config.ffmpeg.path, PathBuf::from("/opt/ffmpeg/ffmpeg"));
            assert_eq!(config.ffmpeg.extra_args, vec!["-loglevel info"]);
            assert_eq!(config.ffmpeg.timeout_secs, 3600);
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn test_load_config_or_default_missing_file() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            let config =
                load_config_or_default(Some(Path::new("/nonexistent/ffconvert.toml"))).unwrap();
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "ffconvert.toml",
                r#"
[ffmpeg]
timeout_secs = 600
"#,
            )?;
            jail.set_env("FFCONVERT_FFMPEG__TIMEOUT_SECS", "60");
            jail.set_env("FFCONVERT_LOGGING__LEVEL", "warn");

            let config = load_config(Path::new("ffconvert.toml")).unwrap();
            assert_eq!(config.ffmpeg.timeout_secs, 60);
            assert_eq!(config.logging.level, "warn");
            Ok(())
        });
    }
}
