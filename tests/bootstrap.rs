//! Navigation bootstrap integration tests: setup/sign-in redirects, layout
//! data and the cached version advisory.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::get, Json, Router};
use edge_gateway::GatewayConfig;
use serde_json::{json, Value};

mod common;

const READY: u8 = 0;
const NEEDS_SETUP: u8 = 1;
const FAILING: u8 = 2;

#[derive(Clone, Default)]
struct BackendState {
    mode: Arc<AtomicU8>,
    settings_down: Arc<AtomicBool>,
    release_calls: Arc<AtomicUsize>,
}

impl BackendState {
    fn with_mode(mode: u8) -> Self {
        let state = Self::default();
        state.mode.store(mode, Ordering::SeqCst);
        state
    }
}

async fn auth_status(
    State(state): State<BackendState>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    let user = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| json!({ "id": 1, "email": "admin@example.com", "token": token }));

    match state.mode.load(Ordering::SeqCst) {
        NEEDS_SETUP => Ok(Json(json!({ "needsSetup": true }))),
        FAILING => Err(StatusCode::INTERNAL_SERVER_ERROR),
        _ => Ok(Json(json!({ "needsSetup": false, "user": user }))),
    }
}

async fn system_settings(State(state): State<BackendState>) -> Result<Json<Value>, StatusCode> {
    if state.settings_down.load(Ordering::SeqCst) {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(Json(json!({
        "language": "en",
        "theme": "dark",
        "supportEmail": "support@example.com"
    })))
}

async fn latest_release(State(state): State<BackendState>) -> Json<Value> {
    state.release_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "tag_name": "v9.9.9",
        "name": "Release 9.9.9",
        "html_url": "https://example.com/releases/v9.9.9"
    }))
}

async fn spawn_session_backend(state: BackendState) -> SocketAddr {
    let app = Router::new()
        .route("/auth/status", get(auth_status))
        .route("/settings/system", get(system_settings))
        .route("/releases/latest", get(latest_release))
        .with_state(state);
    common::spawn_backend(app).await
}

fn bootstrap_config(backend: SocketAddr) -> GatewayConfig {
    let mut config = common::gateway_config(backend);
    config.advisory.enabled = true;
    config.advisory.release_url = format!("http://{}/releases/latest", backend);
    config
}

#[tokio::test]
async fn test_needs_setup_redirects_to_setup() {
    let backend = spawn_session_backend(BackendState::with_mode(NEEDS_SETUP)).await;
    let (gateway, shutdown) = common::spawn_gateway(bootstrap_config(backend)).await;

    let res = common::client()
        .get(format!("http://{}/dashboard", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), reqwest::StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.headers()["location"], "/setup");

    shutdown.trigger();
}

#[tokio::test]
async fn test_setup_page_proceeds_while_setup_pending() {
    let backend = spawn_session_backend(BackendState::with_mode(NEEDS_SETUP)).await;
    let (gateway, shutdown) = common::spawn_gateway(bootstrap_config(backend)).await;

    let res = common::client()
        .get(format!("http://{}/setup", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let layout: Value = res.json().await.unwrap();
    assert_eq!(layout["needsSetup"], true);
    assert_eq!(layout["authenticated"], false);

    shutdown.trigger();
}

#[tokio::test]
async fn test_setup_page_redirects_to_signin_once_set_up() {
    let backend = spawn_session_backend(BackendState::with_mode(READY)).await;
    let (gateway, shutdown) = common::spawn_gateway(bootstrap_config(backend)).await;

    let res = common::client()
        .get(format!("http://{}/setup", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), reqwest::StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.headers()["location"], "/signin");

    shutdown.trigger();
}

#[tokio::test]
async fn test_failed_auth_status_redirects_to_signin() {
    let backend = spawn_session_backend(BackendState::with_mode(FAILING)).await;
    let (gateway, shutdown) = common::spawn_gateway(bootstrap_config(backend)).await;

    let res = common::client()
        .get(format!("http://{}/billing", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), reqwest::StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.headers()["location"], "/signin");

    shutdown.trigger();
}

#[tokio::test]
async fn test_signin_page_proceeds_when_auth_status_fails() {
    let backend = spawn_session_backend(BackendState::with_mode(FAILING)).await;
    let (gateway, shutdown) = common::spawn_gateway(bootstrap_config(backend)).await;

    let res = common::client()
        .get(format!("http://{}/signin", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let layout: Value = res.json().await.unwrap();
    assert_eq!(layout["authenticated"], false);
    assert_eq!(layout["needsSetup"], false);

    shutdown.trigger();
}

#[tokio::test]
async fn test_layout_data_carries_settings_and_advisory() {
    let state = BackendState::with_mode(READY);
    let backend = spawn_session_backend(state.clone()).await;
    let (gateway, shutdown) = common::spawn_gateway(bootstrap_config(backend)).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/dashboard", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), reqwest::StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));

    let layout: Value = res.json().await.unwrap();
    assert_eq!(layout["systemSettings"]["language"], "en");
    assert_eq!(layout["systemSettings"]["supportEmail"], "support@example.com");
    assert_eq!(layout["initialLocale"], "en");
    assert_eq!(layout["currentVersion"], "0.1.0");
    assert_eq!(layout["versionAdvisory"]["version"], "9.9.9");
    assert_eq!(layout["versionAdvisory"]["description"], "Release 9.9.9");
    assert_eq!(
        layout["versionAdvisory"]["url"],
        "https://example.com/releases/v9.9.9"
    );

    for page in ["/archive", "/settings", "/"] {
        let res = client
            .get(format!("http://{}{}", gateway, page))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::OK, "{page}");
        let layout: Value = res.json().await.unwrap();
        assert_eq!(layout["versionAdvisory"]["version"], "9.9.9");
    }

    assert_eq!(state.release_calls.load(Ordering::SeqCst), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_settings_outage_falls_back_to_default_locale() {
    let state = BackendState::with_mode(READY);
    state.settings_down.store(true, Ordering::SeqCst);
    let backend = spawn_session_backend(state).await;
    let (gateway, shutdown) = common::spawn_gateway(bootstrap_config(backend)).await;

    let res = common::client()
        .get(format!("http://{}/dashboard", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let layout: Value = res.json().await.unwrap();
    assert!(layout["systemSettings"].is_null());
    assert_eq!(layout["initialLocale"], "de");

    shutdown.trigger();
}

#[tokio::test]
async fn test_access_token_cookie_is_sent_as_bearer() {
    let backend = spawn_session_backend(BackendState::with_mode(READY)).await;
    let (gateway, shutdown) = common::spawn_gateway(bootstrap_config(backend)).await;

    let res = common::client()
        .get(format!("http://{}/dashboard", gateway))
        .header("cookie", "theme=dark; accessToken=tok-123")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let layout: Value = res.json().await.unwrap();
    assert_eq!(layout["authenticated"], true);
    assert_eq!(layout["user"]["token"], "tok-123");

    shutdown.trigger();
}

#[tokio::test]
async fn test_advisory_disabled_leaves_field_empty() {
    let state = BackendState::with_mode(READY);
    let backend = spawn_session_backend(state.clone()).await;
    let mut config = bootstrap_config(backend);
    config.advisory.enabled = false;
    let (gateway, shutdown) = common::spawn_gateway(config).await;

    let res = common::client()
        .get(format!("http://{}/dashboard", gateway))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let layout: Value = res.json().await.unwrap();
    assert!(layout["versionAdvisory"].is_null());
    assert_eq!(state.release_calls.load(Ordering::SeqCst), 0);

    shutdown.trigger();
}
