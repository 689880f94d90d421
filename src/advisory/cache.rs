//! Process-wide cache of the "newer version available" advisory.
//!
//! # State
//! - `advisory`: lock-free snapshot read by every navigation
//! - `last_checked`: time of the last completed check, behind an async mutex
//!
//! # Refresh Rules
//! ```text
//! last_checked empty            → check
//! now - last_checked > interval → check
//! otherwise                     → skip
//! ```
//! A completed check always stamps `last_checked`, whether it succeeded or not.
//! The advisory only moves forward: empty → X → Y with Y > X.
//!
//! The mutex is held for the whole decide-check-write sequence, so concurrent
//! callers past the interval wait for the in-flight check and then skip.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use semver::Version;
use tokio::sync::Mutex;

use crate::advisory::source::ReleaseSource;
use crate::advisory::types::{Advisory, AdvisoryError, AdvisoryResult};
use crate::observability::metrics;

/// Result of a `maybe_refresh` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The previous check is still fresh; the source was not queried.
    Skipped,
    /// A newer release was found and stored.
    Updated,
    /// The source answered but nothing newer than what we know.
    Unchanged,
    /// The check failed; the stored advisory was kept.
    Failed,
}

impl RefreshOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshOutcome::Skipped => "skipped",
            RefreshOutcome::Updated => "updated",
            RefreshOutcome::Unchanged => "unchanged",
            RefreshOutcome::Failed => "failed",
        }
    }
}

/// Shared advisory cache.
pub struct AdvisoryCache {
    source: Arc<dyn ReleaseSource>,
    running: Version,
    refresh_interval: Duration,
    advisory: ArcSwapOption<Advisory>,
    last_checked: Mutex<Option<Instant>>,
}

impl AdvisoryCache {
    /// Create an empty cache comparing releases against `running_version`.
    pub fn new(
        source: Arc<dyn ReleaseSource>,
        running_version: &str,
        refresh_interval: Duration,
    ) -> AdvisoryResult<Self> {
        let running = Version::parse(running_version)
            .map_err(|_| AdvisoryError::RunningVersion(running_version.to_string()))?;

        Ok(Self {
            source,
            running,
            refresh_interval,
            advisory: ArcSwapOption::empty(),
            last_checked: Mutex::new(None),
        })
    }

    /// Current advisory, if a newer release is known.
    pub fn get(&self) -> Option<Advisory> {
        self.advisory.load_full().map(|a| (*a).clone())
    }

    /// The version the advisory is compared against.
    pub fn running_version(&self) -> &Version {
        &self.running
    }

    /// Query the release source if the last check is older than the interval.
    pub async fn maybe_refresh(&self) -> RefreshOutcome {
        let mut last_checked = self.last_checked.lock().await;
        self.refresh_locked(&mut last_checked, Instant::now()).await
    }

    #[cfg(test)]
    async fn maybe_refresh_at(&self, now: Instant) -> RefreshOutcome {
        let mut last_checked = self.last_checked.lock().await;
        self.refresh_locked(&mut last_checked, now).await
    }

    async fn refresh_locked(&self, last_checked: &mut Option<Instant>, now: Instant) -> RefreshOutcome {
        if let Some(previous) = *last_checked {
            if now.saturating_duration_since(previous) <= self.refresh_interval {
                return RefreshOutcome::Skipped;
            }
        }

        let outcome = match self.check().await {
            Ok(Some(advisory)) => {
                tracing::info!(
                    version = %advisory.version,
                    running = %self.running,
                    url = %advisory.url,
                    "Newer release available"
                );
                self.advisory.store(Some(Arc::new(advisory)));
                RefreshOutcome::Updated
            }
            Ok(None) => {
                tracing::debug!(running = %self.running, "No newer release");
                RefreshOutcome::Unchanged
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch latest release");
                RefreshOutcome::Failed
            }
        };

        *last_checked = Some(now);
        metrics::record_advisory_check(outcome.as_str());
        outcome
    }

    async fn check(&self) -> AdvisoryResult<Option<Advisory>> {
        let release = self.source.latest_release().await?;
        let latest = release.version()?;

        let known = self
            .advisory
            .load_full()
            .and_then(|a| Version::parse(&a.version).ok());
        let floor = match known {
            Some(v) if v > self.running => v,
            _ => self.running.clone(),
        };

        if latest <= floor {
            return Ok(None);
        }

        Ok(Some(Advisory {
            version: latest.to_string(),
            description: release.name.unwrap_or_else(|| release.tag_name.clone()),
            url: release.html_url,
        }))
    }
}
