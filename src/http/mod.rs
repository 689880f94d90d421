//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, layers)
//!     → <mount_prefix>/...  → forward.rs (relay to upstream, stream both ways)
//!     → any other GET       → request.rs (request ID)
//!                           → middleware/session.rs (session guard)
//!                           → 307 redirect | layout data JSON
//!     → response.rs (gateway-generated error bodies)
//! ```

pub mod forward;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{ForwardError, ForwardMethod, ForwardedRequest, Forwarder};
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, GatewayServer};
