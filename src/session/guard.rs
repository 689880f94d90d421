//! Session bootstrap guard.
//!
//! # Redirect Policy
//! ```text
//! auth check ok,   needsSetup=true,  path != /setup   → 307 /setup
//! auth check ok,   needsSetup=false, path == /setup   → 307 /signin
//! auth check ok,   otherwise                          → proceed
//! auth check fail, path != /signin                    → 307 /signin
//! auth check fail, path == /signin                    → proceed
//! ```
//!
//! After proceeding, settings and the version advisory are loaded best-effort.
//! Every branch ends in a `GuardOutcome`; no error leaves this module.

use std::sync::Arc;

use crate::advisory::{Advisory, AdvisoryCache};
use crate::observability::metrics;
use crate::session::backend::BackendApi;
use crate::session::context::{Credentials, SessionContext, SystemSettings};

pub const SETUP_PATH: &str = "/setup";
pub const SIGNIN_PATH: &str = "/signin";

/// Where a navigation gets sent instead of rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Setup,
    Signin,
}

impl RedirectTarget {
    pub fn path(&self) -> &'static str {
        match self {
            RedirectTarget::Setup => SETUP_PATH,
            RedirectTarget::Signin => SIGNIN_PATH,
        }
    }
}

/// Result of the backend auth-status call, reduced to what the policy needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthCheck {
    Completed { needs_setup: bool },
    Failed,
}

/// Redirect decision for one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Redirect(RedirectTarget),
}

impl Decision {
    fn label(&self) -> &'static str {
        match self {
            Decision::Proceed => "proceed",
            Decision::Redirect(RedirectTarget::Setup) => "redirect_setup",
            Decision::Redirect(RedirectTarget::Signin) => "redirect_signin",
        }
    }
}

/// Apply the redirect policy.
pub fn decide(check: AuthCheck, path: &str) -> Decision {
    match check {
        AuthCheck::Completed { needs_setup: true } if path != SETUP_PATH => {
            Decision::Redirect(RedirectTarget::Setup)
        }
        AuthCheck::Completed { needs_setup: false } if path == SETUP_PATH => {
            Decision::Redirect(RedirectTarget::Signin)
        }
        AuthCheck::Completed { .. } => Decision::Proceed,
        AuthCheck::Failed if path != SIGNIN_PATH => Decision::Redirect(RedirectTarget::Signin),
        AuthCheck::Failed => Decision::Proceed,
    }
}

/// Outcome of evaluating a navigation.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    Proceed(SessionContext),
    Redirect(RedirectTarget),
}

/// Runs once per navigation, before any page-specific loader.
pub struct SessionGuard {
    backend: Arc<dyn BackendApi>,
    advisory: Option<Arc<AdvisoryCache>>,
    current_version: String,
}

impl SessionGuard {
    pub fn new(
        backend: Arc<dyn BackendApi>,
        advisory: Option<Arc<AdvisoryCache>>,
        current_version: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            advisory,
            current_version: current_version.into(),
        }
    }

    /// Resolve the navigation to `path` into a redirect or a session context.
    pub async fn evaluate(&self, path: &str, credentials: &Credentials) -> GuardOutcome {
        let (check, user) = match self.backend.auth_status(credentials).await {
            Ok(status) => (
                AuthCheck::Completed {
                    needs_setup: status.needs_setup,
                },
                status.user,
            ),
            Err(e) => {
                if path == SIGNIN_PATH {
                    tracing::warn!(path = %path, error = %e, "Auth status unavailable on sign-in page");
                } else {
                    tracing::error!(path = %path, error = %e, "Failed to get auth status");
                }
                (AuthCheck::Failed, None)
            }
        };

        let decision = decide(check, path);
        metrics::record_guard_decision(decision.label());

        if let Decision::Redirect(target) = decision {
            tracing::debug!(path = %path, target = target.path(), "Redirecting navigation");
            return GuardOutcome::Redirect(target);
        }

        let (system_settings, version_advisory) =
            tokio::join!(self.load_settings(credentials), self.load_advisory());

        GuardOutcome::Proceed(SessionContext {
            needs_setup: matches!(check, AuthCheck::Completed { needs_setup: true }),
            authenticated: user.is_some(),
            user,
            system_settings,
            version_advisory,
            current_version: self.current_version.clone(),
        })
    }

    async fn load_settings(&self, credentials: &Credentials) -> Option<SystemSettings> {
        match self.backend.system_settings(credentials).await {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(error = %e, "System settings unavailable");
                None
            }
        }
    }

    async fn load_advisory(&self) -> Option<Advisory> {
        let cache = self.advisory.as_ref()?;
        cache.maybe_refresh().await;
        cache.get()
    }
}
