//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
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

/// Parse and validate configuration from a TOML string.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let config = parse_config(
            r#"
            [guard]
            allowed_hosts = ["localhost:5000"]
            "#,
        )
        .unwrap();
        assert_eq!(config.guard.allowed_hosts, vec!["localhost:5000"]);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[guard\nallowed_hosts = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_errors_joined() {
        let err = parse_config(
            r#"
            [guard]
            allowed_hosts = []
            host_sources = []
            "#,
        )
        .unwrap_err();
        let ConfigError::Validation(errors) = &err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.len(), 2);
        assert!(err.to_string().contains(", "));
    }

    #[test]
    fn test_shipped_config_loads() {
        let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/allowed-hosts.toml"));
        let config = load_config(path).unwrap();
        assert_eq!(config.guard.allowed_hosts, vec!["127.0.0.1:5000", "localhost:5000"]);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
