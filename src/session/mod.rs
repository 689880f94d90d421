//! Session bootstrap subsystem.
//!
//! # Data Flow
//! ```text
//! Navigation (GET outside the mount prefix)
//!     → context.rs (credentials from Authorization / accessToken cookie)
//!     → guard.rs
//!         → backend.rs GET /auth/status → redirect policy
//!         → backend.rs GET /settings/system (best effort)
//!         → advisory cache (best effort)
//!     → GuardOutcome::Redirect(target) | GuardOutcome::Proceed(SessionContext)
//! ```
//!
//! # Design Decisions
//! - Redirects are values, not errors
//! - Only the auth check influences control flow; the rest degrades to `None`
//! - Backend access sits behind `BackendApi` so the policy is testable offline

pub mod backend;
pub mod context;
pub mod guard;

pub use backend::{BackendApi, BackendError, HttpBackend};
pub use context::{AuthStatus, Credentials, LayoutData, SessionContext, SystemSettings};
pub use guard::{decide, AuthCheck, Decision, GuardOutcome, RedirectTarget, SessionGuard};
