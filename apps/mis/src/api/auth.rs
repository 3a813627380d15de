//! # Authentication
//!
//! Optional shared-key gate in front of the MIS API.
//!
//! The key comes from [`crate::config::SecurityConfig::api_key`] (or
//! `MIS_API_KEY`). When it is set every route except `/health` needs
//!
//! ```text
//! Authorization: Bearer <key>
//! ```
//!
//! A bare `<key>` without the scheme is accepted too.

use super::types::ErrorResponse;
use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Expected key, shared by all requests.
pub type ApiKey = Arc<str>;

/// Routes reachable without a key.
const PUBLIC_PATHS: [&str; 1] = ["/health"];

/// Constant-time key comparison.
///
/// Both sides are zero-padded to a common length before `ct_eq`, and the
/// length check is folded in after, so neither content nor length of the
/// expected key leaks through timing.
pub fn keys_match(provided: &str, expected: &str) -> bool {
    let len = provided.len().max(expected.len());
    let pad = |s: &str| {
        let mut buf = vec![0u8; len];
        buf[..s.len()].copy_from_slice(s.as_bytes());
        buf
    };

    let same_bytes: bool = pad(provided).ct_eq(&pad(expected)).into();
    same_bytes && provided.len() == expected.len()
}

/// Pull the key out of an `Authorization` header value.
fn presented_key(value: &str) -> &str {
    value.strip_prefix("Bearer ").unwrap_or(value)
}

fn unauthorized(reason: &'static str, path: &str) -> Response {
    tracing::warn!(event = "auth_failure", reason, path, "Request rejected");
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new("Unauthorized")),
    )
        .into_response()
}

/// Reject requests that do not carry the configured key.
pub async fn api_key_auth_middleware(
    State(expected): State<ApiKey>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    if PUBLIC_PATHS.contains(&path.as_str()) {
        return next.run(request).await;
    }

    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match header_value.map(presented_key) {
        Some(key) if keys_match(key, &expected) => next.run(request).await,
        Some(_) => unauthorized("invalid_api_key", &path),
        None => unauthorized("missing_authorization_header", &path),
    }
}
