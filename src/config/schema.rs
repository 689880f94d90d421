//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Internal backend the gateway fronts.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Version advisory check settings.
    pub advisory: AdvisoryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Internal backend service location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Backend host name or IP.
    pub host: String,

    /// Backend port. `PORT_BACKEND` overrides this at load time.
    pub port: u16,

    /// Path prefix under which requests are forwarded verbatim.
    pub mount_prefix: String,
}

impl UpstreamConfig {
    /// Origin of the backend, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 4000,
            mount_prefix: "/api".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total time allowed for a navigation (guard + layout data) in seconds.
    pub navigation_secs: u64,

    /// Timeout for backend calls made by the session guard in seconds.
    pub backend_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            navigation_secs: 30,
            backend_secs: 10,
        }
    }
}

/// Version advisory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// Enable the external release check.
    pub enabled: bool,

    /// Endpoint returning the latest published release.
    pub release_url: String,

    /// Minimum seconds between two release checks.
    pub refresh_interval_secs: u64,

    /// Timeout for a single release check in seconds.
    pub timeout_secs: u64,

    /// Version of the application being served. Defaults to this crate's version.
    pub current_version: Option<String>,
}

impl AdvisoryConfig {
    /// The running version the advisory is compared against.
    pub fn running_version(&self) -> &str {
        self.current_version
            .as_deref()
            .unwrap_or(env!("CARGO_PKG_VERSION"))
    }
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            release_url: "https://api.github.com/repos/LogicLabs-OU/OpenArchiver/releases/latest"
                .to_string(),
            refresh_interval_secs: 60 * 60,
            timeout_secs: 5,
            current_version: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
