//! Version advisory subsystem.
//!
//! # Data Flow
//! ```text
//! Navigation (session guard)
//!     → cache.rs maybe_refresh() (at most once per interval, single-flight)
//!         → source.rs (GET latest release, timeout-bounded)
//!         → types.rs (strip tag marker, semver compare)
//!     → cache.rs get() (lock-free snapshot)
//! ```
//!
//! # Design Decisions
//! - Failures are logged and stamped, never surfaced to users
//! - The advisory is monotonic: it never reverts or downgrades
//! - The source sits behind a trait so tests can script answers

pub mod cache;
pub mod source;
pub mod types;

pub use cache::{AdvisoryCache, RefreshOutcome};
pub use source::{HttpReleaseSource, ReleaseSource};
pub use types::{Advisory, AdvisoryError, ReleaseInfo};
