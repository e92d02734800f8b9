//! Admin authentication: a shared secret in the `x-admin-key` header.
//!
//! Applied uniformly to every `/api/admin/*` route, resolving the spec's
//! open question about 401-vs-403 on the settle variant in favor of a
//! single consistent 403 (see DESIGN.md).

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

const HEADER: &str = "x-admin-key";

/// `axum` middleware: reject the request unless `x-admin-key` matches
/// `Settings.admin_key`. A missing `admin_key` configuration fails closed.
pub async fn require_admin_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = headers.get(HEADER).and_then(|v| v.to_str().ok());
    let expected = state.settings.admin_key.as_deref();

    match (expected, provided) {
        (Some(expected), Some(provided)) if !expected.is_empty() && expected == provided => {
            Ok(next.run(request).await)
        }
        _ => Err(ApiError::Forbidden),
    }
}
