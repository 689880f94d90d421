//! Network layer subsystem.
//!
//! Listeners are plain `tokio::net::TcpListener`s; when `listener.tls` is
//! configured, tls.rs loads the rustls certificate pair and the HTTP layer
//! serves through `axum-server`.

pub mod tls;
