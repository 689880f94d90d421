//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the Axum router: mount-prefix catch-all and guarded navigations
//! - Wire up middleware (tracing, request ID, navigation timeout)
//! - Serve over plain TCP or TLS until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, on},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::advisory::{AdvisoryCache, HttpReleaseSource};
use crate::config::GatewayConfig;
use crate::http::forward::{forward_handler, ForwardMethod, Forwarder};
use crate::http::middleware::{layout_data_handler, session_guard_middleware};
use crate::http::request::MakeRequestUuid;
use crate::lifecycle::startup::StartupError;
use crate::session::{HttpBackend, SessionGuard};

/// How long in-flight requests may drain after shutdown on the TLS path.
const TLS_DRAIN_SECS: u64 = 10;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    pub guard: Arc<SessionGuard>,
}

impl FromRef<AppState> for Arc<Forwarder> {
    fn from_ref(state: &AppState) -> Self {
        state.forwarder.clone()
    }
}

impl FromRef<AppState> for Arc<SessionGuard> {
    fn from_ref(state: &AppState) -> Self {
        state.guard.clone()
    }
}

impl AppState {
    /// Build the production state from configuration.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, StartupError> {
        let forwarder = Arc::new(Forwarder::new(&config.upstream, &config.timeouts));
        let backend = Arc::new(HttpBackend::new(&config.upstream, &config.timeouts)?);

        let advisory = if config.advisory.enabled {
            let source = Arc::new(HttpReleaseSource::new(&config.advisory)?);
            let cache = AdvisoryCache::new(
                source,
                config.advisory.running_version(),
                Duration::from_secs(config.advisory.refresh_interval_secs),
            )?;
            Some(Arc::new(cache))
        } else {
            tracing::info!("Version advisory check disabled");
            None
        };

        let guard = Arc::new(SessionGuard::new(
            backend,
            advisory,
            config.advisory.running_version(),
        ));

        Ok(Self { forwarder, guard })
    }
}

/// HTTP server for the edge gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let state = AppState::from_config(&config)?;
        Ok(Self::with_state(config, state))
    }

    /// Create a server around pre-built subsystems.
    pub fn with_state(config: GatewayConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let pages = Router::new()
            .route("/", get(layout_data_handler))
            .route("/{*path}", get(layout_data_handler))
            .route_layer(middleware::from_fn_with_state(
                state.guard.clone(),
                session_guard_middleware,
            ))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.navigation_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        let prefix = config.upstream.mount_prefix.as_str();
        let api = Router::new()
            .route(prefix, on(ForwardMethod::filter(), forward_handler))
            .route(&format!("{}/{{*path}}", prefix), on(ForwardMethod::filter(), forward_handler));

        pages
            .merge(api)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The assembled router, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url(),
            mount_prefix = %self.config.upstream.mount_prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS on the given listener.
    pub async fn run_tls(
        self,
        listener: TcpListener,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        axum_server::from_tcp_rustls(listener.into_std()?, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
