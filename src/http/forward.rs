//! Request forwarder.
//!
//! # Responsibilities
//! - Strip the mount prefix and keep the original query string
//! - Relay method, headers and body stream to the upstream unchanged
//! - Relay the upstream status, headers and body stream back unchanged
//! - Turn an unreachable upstream into a 500 JSON response
//!
//! # Design Decisions
//! - Bodies are never buffered: `Body` in, `Incoming` out
//! - Only connection establishment has a deadline; the exchange itself may be
//!   arbitrarily long (large uploads, streamed downloads)

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::MethodFilter,
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::http::request::request_id;
use crate::http::response::{backend_unreachable, json_error};
use crate::observability::metrics;

/// Methods relayed to the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl ForwardMethod {
    pub const ALL: [ForwardMethod; 5] = [
        ForwardMethod::Get,
        ForwardMethod::Post,
        ForwardMethod::Put,
        ForwardMethod::Patch,
        ForwardMethod::Delete,
    ];

    pub fn as_method(&self) -> Method {
        match self {
            ForwardMethod::Get => Method::GET,
            ForwardMethod::Post => Method::POST,
            ForwardMethod::Put => Method::PUT,
            ForwardMethod::Patch => Method::PATCH,
            ForwardMethod::Delete => Method::DELETE,
        }
    }

    /// Router filter accepting exactly the forwarded methods.
    pub fn filter() -> MethodFilter {
        MethodFilter::GET
            .or(MethodFilter::POST)
            .or(MethodFilter::PUT)
            .or(MethodFilter::PATCH)
            .or(MethodFilter::DELETE)
    }
}

impl TryFrom<&Method> for ForwardMethod {
    type Error = ForwardError;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        ForwardMethod::ALL
            .into_iter()
            .find(|m| m.as_method() == *method)
            .ok_or_else(|| ForwardError::UnsupportedMethod(method.clone()))
    }
}

/// Errors while relaying a request.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("Method {0} is not forwarded")]
    UnsupportedMethod(Method),

    #[error("Path '{0}' is outside the mount prefix")]
    OutsideMount(String),

    #[error("Invalid upstream target: {0}")]
    InvalidTarget(#[from] axum::http::Error),

    #[error("{0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        match self {
            ForwardError::UnsupportedMethod(_) => {
                json_error(StatusCode::METHOD_NOT_ALLOWED, self.to_string())
            }
            ForwardError::OutsideMount(_) => json_error(StatusCode::NOT_FOUND, self.to_string()),
            ForwardError::InvalidTarget(_) | ForwardError::Upstream(_) => backend_unreachable(&self),
        }
    }
}

/// One inbound request, ready to be relayed.
pub struct ForwardedRequest {
    pub method: ForwardMethod,
    /// Upstream path and query, always starting with `/`.
    pub target: String,
    pub headers: HeaderMap,
    pub body: Body,
}

impl ForwardedRequest {
    pub fn from_inbound(mount_prefix: &str, request: Request<Body>) -> Result<Self, ForwardError> {
        let (parts, body) = request.into_parts();
        Ok(Self {
            method: ForwardMethod::try_from(&parts.method)?,
            target: target_path(mount_prefix, &parts.uri)?,
            headers: parts.headers,
            body,
        })
    }

    /// Build the upstream request against `upstream_base` (no trailing slash).
    pub fn into_upstream(self, upstream_base: &str) -> Result<Request<Body>, ForwardError> {
        let mut request = Request::builder()
            .method(self.method.as_method())
            .uri(format!("{}{}", upstream_base, self.target))
            .body(self.body)?;
        *request.headers_mut() = self.headers;
        Ok(request)
    }
}

/// Path below the mount prefix plus the original query string.
///
/// `/api/users/7?expand=roles` under `/api` becomes `/users/7?expand=roles`.
pub fn target_path(mount_prefix: &str, uri: &Uri) -> Result<String, ForwardError> {
    let path = uri.path();
    let rest = path
        .strip_prefix(mount_prefix)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        .ok_or_else(|| ForwardError::OutsideMount(path.to_string()))?;

    let sub_path = rest.strip_prefix('/').unwrap_or(rest);
    let mut target = format!("/{}", sub_path);
    if let Some(query) = uri.query().filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }
    Ok(target)
}

/// Relays requests under the mount prefix to the upstream.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    upstream_base: String,
    mount_prefix: String,
}

impl Forwarder {
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            upstream_base: upstream.base_url(),
            mount_prefix: upstream.mount_prefix.clone(),
        }
    }

    pub fn mount_prefix(&self) -> &str {
        &self.mount_prefix
    }

    /// Relay a request; never fails, errors become JSON responses.
    pub async fn forward(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let request_id = request_id(request.headers()).unwrap_or("-").to_string();

        match self.relay(request).await {
            Ok(response) => {
                let status = response.status();
                tracing::debug!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    status = %status,
                    "Forwarded request"
                );
                metrics::record_forward(method.as_str(), status.as_u16(), start);
                response
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    upstream = %self.upstream_base,
                    error = %e,
                    "Proxy request failed"
                );
                if matches!(e, ForwardError::Upstream(_) | ForwardError::InvalidTarget(_)) {
                    metrics::record_forward_failure(method.as_str());
                }
                e.into_response()
            }
        }
    }

    async fn relay(&self, request: Request<Body>) -> Result<Response, ForwardError> {
        let upstream = ForwardedRequest::from_inbound(&self.mount_prefix, request)?
            .into_upstream(&self.upstream_base)?;

        let response: Response<Incoming> = self.client.request(upstream).await?;
        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Catch-all handler for the mount prefix.
pub async fn forward_handler(
    State(forwarder): State<Arc<Forwarder>>,
    request: Request<Body>,
) -> Response {
    forwarder.forward(request).await
}
