//! Configuration parsing and validation for focusgate
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Daemon settings (data dir, rules file, tick interval, block page)
//! - The fixed baseline blocking list
//! - An optional seed schedule
//!
//! Also converts the stored weekly schedule into a validated
//! `WeeklySchedule`.

mod schedule;
mod schema;
mod settings;
mod validation;

pub use schedule::*;
pub use schema::*;
pub use settings::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load configuration, falling back to defaults when the file does not exist
pub fn load_config_or_default(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    match std::fs::read_to_string(path.as_ref()) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(
                path = %path.as_ref().display(),
                "No config file, using defaults"
            );
            Ok(Settings::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Settings> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(Settings::from_raw(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_minimal_config() {
        let settings = parse_config("config_version = 1").unwrap();
        assert!(settings.baseline.domains.is_empty());
        assert!(settings.seed_schedule.is_none());
    }

    #[test]
    fn reject_wrong_version() {
        let result = parse_config("config_version = 99");
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn reject_malformed_seed_schedule() {
        let config = r#"
            config_version = 1

            [schedule.monday]
            enabled = true
            start = "9"
            end = "17:00"
        "#;

        let result = parse_config(config);
        assert!(matches!(
            result,
            Err(ConfigError::ValidationFailed { ref errors }) if errors.len() == 1
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            config_version = 1

            [baseline]
            ruleset_id = "work"
            domains = ["news.example.com"]
            "#
        )
        .unwrap();

        let settings = load_config(file.path()).unwrap();
        assert_eq!(settings.baseline.ruleset_id.as_str(), "work");
        assert_eq!(settings.baseline.domains.len(), 1);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_config_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.daemon.block_page, DEFAULT_BLOCK_PAGE);

        assert!(matches!(
            load_config(dir.path().join("absent.toml")),
            Err(ConfigError::ReadError(_))
        ));
    }
}
