//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::RefinerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RefinerConfig, ConfigError> {
    let config: RefinerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RefinerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Build the startup configuration from an optional file and an optional
/// bind address override. The merged result is validated.
pub fn resolve_config(path: Option<&Path>, bind: Option<String>) -> Result<RefinerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => RefinerConfig::default(),
    };
    if let Some(bind) = bind {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let config = parse_config("[listener]\nbind_address = \"127.0.0.1:9000\"\n").unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[refinement\nmax_attempts = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_fields() {
        let err = parse_config("[refinement]\nmax_attempts = 0\nmin_step = 0\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Validation failed: "));
        assert!(msg.contains("refinement.max_attempts"));
        assert!(msg.contains("refinement.min_step"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!("route-refiner-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[detection]\nmode = \"mock\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.detection.mode, crate::config::DetectionMode::Mock);

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_bind_override_is_validated() {
        let config = resolve_config(None, Some("127.0.0.1:9100".to_string())).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9100");

        let err = resolve_config(None, Some("not-an-address".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("listener.bind_address"));
    }

    #[test]
    fn test_bind_override_replaces_file_address() {
        let path = std::env::temp_dir().join(format!("route-refiner-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[listener]\nbind_address = \"bogus\"\n").unwrap();

        assert!(matches!(resolve_config(Some(&path), None), Err(ConfigError::Validation(_))));
        let config = resolve_config(Some(&path), Some("0.0.0.0:8080".to_string())).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");

        fs::remove_file(&path).unwrap_or_default();
    }
}
