//! Configuration validation.
//!
//! Serde handles the syntax; this module checks value ranges and formats.
//! All problems are collected so an operator can fix them in one pass.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// Human readable explanation.
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Validate a parsed configuration, returning every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.upstream.host.trim().is_empty() {
        errors.push(ValidationError::new("upstream.host", "must not be empty"));
    }
    if config.upstream.port == 0 {
        errors.push(ValidationError::new("upstream.port", "must be non-zero"));
    }

    let prefix = &config.upstream.mount_prefix;
    if !prefix.starts_with('/') || prefix == "/" || prefix.ends_with('/') {
        errors.push(ValidationError::new(
            "upstream.mount_prefix",
            format!("'{}' must start with '/', and must not be '/' or end with '/'", prefix),
        ));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be > 0"));
    }
    if config.timeouts.navigation_secs == 0 {
        errors.push(ValidationError::new("timeouts.navigation_secs", "must be > 0"));
    }
    if config.timeouts.backend_secs == 0 {
        errors.push(ValidationError::new("timeouts.backend_secs", "must be > 0"));
    }

    let advisory = &config.advisory;
    if semver::Version::parse(advisory.running_version()).is_err() {
        errors.push(ValidationError::new(
            "advisory.current_version",
            format!("'{}' is not a semantic version", advisory.running_version()),
        ));
    }
    if advisory.enabled {
        if let Err(e) = url::Url::parse(&advisory.release_url) {
            errors.push(ValidationError::new(
                "advisory.release_url",
                format!("'{}': {}", advisory.release_url, e),
            ));
        }
        if advisory.refresh_interval_secs == 0 {
            errors.push(ValidationError::new("advisory.refresh_interval_secs", "must be > 0"));
        }
        if advisory.timeout_secs == 0 {
            errors.push(ValidationError::new("advisory.timeout_secs", "must be > 0"));
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
