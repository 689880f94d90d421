//! Shared utilities for integration tests.

use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::DefaultBodyLimit,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use edge_gateway::{GatewayConfig, GatewayServer, Shutdown};
use tokio::net::TcpListener;

/// Echoed bodies above this size are summarized by length only.
const ECHO_BODY_LIMIT: usize = 64 * 1024;

/// Serve `app` on an ephemeral port.
pub async fn spawn_backend(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Backend that describes every request it receives.
///
/// `x-want-status` picks the response status; the response always carries
/// `x-upstream: mock` and a `set-cookie` header.
#[allow(dead_code)]
pub fn echo_backend() -> Router {
    Router::new()
        .fallback(echo)
        .layer(DefaultBodyLimit::disable())
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let status = headers
        .get("x-want-status")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u16>().ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::OK);
    let probe = headers
        .get("x-probe")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let echoed = if body.len() <= ECHO_BODY_LIMIT {
        String::from_utf8_lossy(&body).into_owned()
    } else {
        String::new()
    };

    (
        status,
        [("x-upstream", "mock"), ("set-cookie", "session=abc; Path=/")],
        Json(serde_json::json!({
            "method": method.as_str(),
            "uri": uri.to_string(),
            "probe": probe,
            "len": body.len(),
            "body": echoed,
        })),
    )
        .into_response()
}

/// Gateway config pointing at `backend`, advisory check off.
pub fn gateway_config(backend: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.host = backend.ip().to_string();
    config.upstream.port = backend.port();
    config.advisory.enabled = false;
    config.advisory.current_version = Some("0.1.0".into());
    config
}

/// Start the gateway on an ephemeral port.
pub async fn spawn_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let server = GatewayServer::new(config).expect("gateway should build");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// A port nothing listens on.
#[allow(dead_code)]
pub fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Client that neither follows redirects nor uses a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
