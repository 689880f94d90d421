//! Per-navigation session context and the credentials it is resolved with.

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

use crate::advisory::Advisory;

/// Cookie carrying the access token for browser navigations.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Locale used when system settings are unavailable.
pub const FALLBACK_LOCALE: &str = "de";

/// System-wide settings reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    pub language: String,
    pub theme: String,
    #[serde(default)]
    pub support_email: Option<String>,
}

/// Backend auth-status payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub needs_setup: bool,
    /// Opaque user record, present when the caller is signed in.
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

/// Everything downstream page loaders need about the current navigation.
///
/// `system_settings` and `version_advisory` being `None` are normal states.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub needs_setup: bool,
    pub authenticated: bool,
    pub user: Option<serde_json::Value>,
    pub system_settings: Option<SystemSettings>,
    pub version_advisory: Option<Advisory>,
    pub current_version: String,
}

impl SessionContext {
    /// Locale the page should initially render in.
    pub fn initial_locale(&self) -> &str {
        self.system_settings
            .as_ref()
            .map(|s| s.language.as_str())
            .filter(|l| !l.is_empty())
            .unwrap_or(FALLBACK_LOCALE)
    }
}

/// JSON handed to the page renderer for a navigation that proceeds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutData {
    #[serde(flatten)]
    pub context: SessionContext,
    pub initial_locale: String,
}

impl From<SessionContext> for LayoutData {
    fn from(context: SessionContext) -> Self {
        let initial_locale = context.initial_locale().to_string();
        Self {
            context,
            initial_locale,
        }
    }
}

/// Caller credentials forwarded to backend calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    access_token: Option<String>,
}

impl Credentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
        }
    }

    /// Read the access token from `Authorization: Bearer`, else from the cookie.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let from_auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let access_token = from_auth.or_else(|| {
            headers
                .get_all(header::COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .flat_map(|v| v.split(';'))
                .filter_map(|pair| pair.trim().split_once('='))
                .find(|(name, value)| *name == ACCESS_TOKEN_COOKIE && !value.is_empty())
                .map(|(_, value)| value.to_string())
        });

        Self { access_token }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}
