//! Session guard middleware.
//! Gates navigations and hands the resolved context to page handlers.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};

use crate::session::{Credentials, GuardOutcome, LayoutData, SessionContext, SessionGuard};

pub async fn session_guard_middleware(
    State(guard): State<Arc<SessionGuard>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let credentials = Credentials::from_headers(request.headers());
    let path = request.uri().path().to_string();

    match guard.evaluate(&path, &credentials).await {
        GuardOutcome::Redirect(target) => Redirect::temporary(target.path()).into_response(),
        GuardOutcome::Proceed(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
    }
}

/// Layout data for a navigation that passed the guard.
pub async fn layout_data_handler(Extension(context): Extension<SessionContext>) -> Json<LayoutData> {
    Json(context.into())
}
