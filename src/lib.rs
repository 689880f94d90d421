//! Edge gateway library.
//!
//! Forwards API traffic to the internal backend, gates page navigations on
//! the backend's setup/auth state, and caches the "newer version available"
//! advisory.

// Core subsystems
pub mod config;
pub mod http;
pub mod net;

// Navigation bootstrap
pub mod advisory;
pub mod session;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
