//! Client for the internal backend's session endpoints.
//!
//! # Responsibilities
//! - Generic "call the backend with this path" primitive (`HttpBackend::api`)
//! - Typed calls for auth status and system settings
//! - Map transport, status and decode failures to `BackendError`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use thiserror::Error;
use url::Url;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::session::context::{AuthStatus, Credentials, SystemSettings};

/// Backend path reporting setup/auth state.
pub const AUTH_STATUS_PATH: &str = "/auth/status";

/// Backend path reporting system settings.
pub const SYSTEM_SETTINGS_PATH: &str = "/settings/system";

/// Errors from backend calls.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Invalid backend URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected backend payload: {0}")]
    Decode(String),
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Backend calls the session guard depends on.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn auth_status(&self, credentials: &Credentials) -> BackendResult<AuthStatus>;

    async fn system_settings(&self, credentials: &Credentials) -> BackendResult<SystemSettings>;
}

/// HTTP implementation talking to the configured upstream.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> BackendResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.backend_secs))
            .no_proxy()
            .build()?;
        let base = Url::parse(&format!("{}/", upstream.base_url()))?;
        Ok(Self { client, base })
    }

    /// Issue a call against the backend.
    ///
    /// The response is returned whatever its status; callers decide what a
    /// non-success status means for them.
    pub async fn api(
        &self,
        method: Method,
        path: &str,
        credentials: &Credentials,
    ) -> BackendResult<reqwest::Response> {
        let url = self.base.join(path.trim_start_matches('/'))?;
        let mut request = self.client.request(method, url);
        if let Some(token) = credentials.access_token() {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        credentials: &Credentials,
    ) -> BackendResult<T> {
        let response = self.api(Method::GET, path, credentials).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn auth_status(&self, credentials: &Credentials) -> BackendResult<AuthStatus> {
        self.get_json(AUTH_STATUS_PATH, credentials).await
    }

    async fn system_settings(&self, credentials: &Credentials) -> BackendResult<SystemSettings> {
        self.get_json(SYSTEM_SETTINGS_PATH, credentials).await
    }
}
