//! Responses synthesized by the gateway itself.
//!
//! Upstream responses are relayed untouched; only failures the gateway
//! detects on its own get a body from here, always `{"message": ...}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Prefix of every "upstream unreachable" message.
pub const BACKEND_UNREACHABLE: &str = "Failed to connect to the backend service.";

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Build a JSON error response.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            message: message.into(),
        }),
    )
        .into_response()
}

/// 500 response for an upstream that could not be reached.
pub fn backend_unreachable(details: impl std::fmt::Display) -> Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("{} {}", BACKEND_UNREACHABLE, details),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_backend_unreachable_body() {
        let response = backend_unreachable("connection refused");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json["message"],
            "Failed to connect to the backend service. connection refused"
        );
    }
}
