//! Advisory records and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A newer release than the one currently running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    /// Version string of the newer release, without any `v` marker.
    pub version: String,
    /// Human readable release title.
    pub description: String,
    /// Where the release notes live.
    pub url: String,
}

/// Latest release as reported by the external release source.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseInfo {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    pub html_url: String,
}

impl ReleaseInfo {
    /// Parse the tag into a semantic version.
    ///
    /// Leading non-numeric markers such as `v` or `release-` are stripped.
    pub fn version(&self) -> Result<semver::Version, AdvisoryError> {
        let trimmed = self.tag_name.trim_start_matches(|c: char| !c.is_ascii_digit());
        semver::Version::parse(trimmed).map_err(|e| AdvisoryError::InvalidVersion {
            tag: self.tag_name.clone(),
            reason: e.to_string(),
        })
    }
}

/// Errors that can occur while checking for a newer release.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    /// The release source could not be reached.
    #[error("Release source unreachable: {0}")]
    Transport(String),

    /// The release source answered with a non-success status.
    #[error("Release source returned status {0}")]
    Status(u16),

    /// The payload was not the expected JSON shape.
    #[error("Malformed release payload: {0}")]
    Payload(String),

    /// The release tag is not a semantic version.
    #[error("Release tag '{tag}' is not a semantic version: {reason}")]
    InvalidVersion { tag: String, reason: String },

    /// The running version is not a semantic version.
    #[error("Running version '{0}' is not a semantic version")]
    RunningVersion(String),
}

/// Result type for advisory operations.
pub type AdvisoryResult<T> = Result<T, AdvisoryError>;
