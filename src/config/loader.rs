//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `upstream.port`.
pub const PORT_BACKEND_ENV: &str = "PORT_BACKEND";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid PORT_BACKEND value '{0}'")]
    Env(String),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;
    finish(config, std::env::var(PORT_BACKEND_ENV).ok())
}

/// Build the configuration from defaults when no file is given.
pub fn load_default_config() -> Result<GatewayConfig, ConfigError> {
    finish(GatewayConfig::default(), std::env::var(PORT_BACKEND_ENV).ok())
}

fn finish(mut config: GatewayConfig, port_backend: Option<String>) -> Result<GatewayConfig, ConfigError> {
    apply_env_overrides(&mut config, port_backend)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment overrides on top of file values.
fn apply_env_overrides(config: &mut GatewayConfig, port_backend: Option<String>) -> Result<(), ConfigError> {
    if let Some(raw) = port_backend.filter(|v| !v.trim().is_empty()) {
        config.upstream.port = raw.trim().parse().map_err(|_| ConfigError::Env(raw))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_backend_override() {
        let config = finish(GatewayConfig::default(), Some("4321".into())).unwrap();
        assert_eq!(config.upstream.port, 4321);
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let config = finish(GatewayConfig::default(), Some("  ".into())).unwrap();
        assert_eq!(config.upstream.port, 4000);
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let err = finish(GatewayConfig::default(), Some("eighty".into())).unwrap_err();
        assert!(matches!(err, ConfigError::Env(v) if v == "eighty"));
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join(format!("edge-gateway-{}.toml", std::process::id()));
        fs::write(
            &path,
            r#"
            [upstream]
            host = "backend"
            port = 4500
            mount_prefix = "/v1"

            [advisory]
            enabled = false
            "#,
        )
        .unwrap();

        let config = load_config(&path);
        std::fs::remove_file(&path).unwrap_or_default();

        // PORT_BACKEND may be set in the environment running the tests.
        let config = config.unwrap();
        assert_eq!(config.upstream.host, "backend");
        assert_eq!(config.upstream.mount_prefix, "/v1");
        assert!(!config.advisory.enabled);
    }

    #[test]
    fn test_validation_error_message_lists_fields() {
        let mut config = GatewayConfig::default();
        config.upstream.host = String::new();
        config.upstream.port = 0;

        let err = finish(config, None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("upstream.host"));
        assert!(msg.contains("upstream.port"));
    }
}
