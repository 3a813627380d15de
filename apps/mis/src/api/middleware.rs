//! # Rate Limiting
//!
//! One global token bucket for the whole API, sized from
//! [`crate::config::SecurityConfig::rate_limit`] (requests per second).
//! Rejected requests get `429` with a `Retry-After` header.

use super::types::ErrorResponse;
use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Used when a zero limit reaches the constructor.
const FALLBACK_RPS: NonZeroU32 = match NonZeroU32::new(crate::config::DEFAULT_RATE_LIMIT) {
    Some(rps) => rps,
    None => NonZeroU32::MIN,
};

/// Shared limiter handed to the middleware as state.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Build a limiter allowing `requests_per_second`, bursting up to the same.
pub fn create_rate_limiter(requests_per_second: u32) -> GlobalRateLimiter {
    let rps = NonZeroU32::new(requests_per_second).unwrap_or(FALLBACK_RPS);
    Arc::new(RateLimiter::direct(Quota::per_second(rps)))
}

pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let not_until = match limiter.check() {
        Ok(()) => return next.run(request).await,
        Err(not_until) => not_until,
    };

    // Whole seconds, rounded up
    let wait = not_until.wait_time_from(DefaultClock::default().now());
    let retry_after = wait.as_secs().saturating_add(u64::from(wait.subsec_nanos() > 0));

    tracing::warn!(
        event = "rate_limited",
        path = %request.uri().path(),
        retry_after,
        "Rate limit exceeded"
    );

    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse::new("Too Many Requests")),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}
