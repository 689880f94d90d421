//! Startup orchestration.
//!
//! Load config → init metrics → build subsystems → bind listener → serve.
//! Any error before the listener accepts traffic is fatal.

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::advisory::AdvisoryError;
use crate::config::{load_config, load_default_config, ConfigError, GatewayConfig};
use crate::http::GatewayServer;
use crate::lifecycle::{signals, Shutdown};
use crate::net::tls::load_tls_config;
use crate::observability::metrics;
use crate::session::BackendError;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend client error: {0}")]
    Backend(#[from] BackendError),

    #[error("Advisory setup error: {0}")]
    Advisory(#[from] AdvisoryError),

    #[error("TLS error: {0}")]
    Tls(std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load the configuration file, or defaults when no path is given.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, StartupError> {
    let config = match path {
        Some(path) => load_config(path)?,
        None => load_default_config()?,
    };
    Ok(config)
}

/// Run the gateway until a termination signal arrives.
pub async fn run(config: GatewayConfig) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url(),
        mount_prefix = %config.upstream.mount_prefix,
        tls = config.listener.tls.is_some(),
        advisory = config.advisory.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let tls = config.listener.tls.clone();
    let server = GatewayServer::new(config.clone())?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_termination().await;
        shutdown.trigger();
    });

    match tls {
        Some(tls) => {
            let rustls = load_tls_config(Path::new(&tls.cert_path), Path::new(&tls.key_path))
                .await
                .map_err(StartupError::Tls)?;
            server.run_tls(listener, rustls, server_shutdown).await?;
        }
        None => server.run(listener, server_shutdown).await?,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
