//! HTTP middleware.

pub mod session;

pub use session::{layout_data_handler, session_guard_middleware};
