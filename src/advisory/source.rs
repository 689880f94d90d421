//! External release source.
//!
//! # Responsibilities
//! - Fetch the latest published release from the release endpoint
//! - Bound every call with a timeout
//! - Map transport, status and payload failures to `AdvisoryError`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};

use crate::advisory::types::{AdvisoryError, AdvisoryResult, ReleaseInfo};
use crate::config::AdvisoryConfig;

/// Anything that can report the latest published release.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn latest_release(&self) -> AdvisoryResult<ReleaseInfo>;
}

/// Release source backed by a GitHub-style "latest release" endpoint.
#[derive(Clone)]
pub struct HttpReleaseSource {
    client: reqwest::Client,
    url: String,
}

impl HttpReleaseSource {
    /// Create a release source from configuration.
    pub fn new(config: &AdvisoryConfig) -> AdvisoryResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        // GitHub rejects requests without a user agent.
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("edge-gateway/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| AdvisoryError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: config.release_url.clone(),
        })
    }

    /// The endpoint being queried.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ReleaseSource for HttpReleaseSource {
    async fn latest_release(&self) -> AdvisoryResult<ReleaseInfo> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AdvisoryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisoryError::Status(status.as_u16()));
        }

        response
            .json::<ReleaseInfo>()
            .await
            .map_err(|e| AdvisoryError::Payload(e.to_string()))
    }
}
