//! # MIS HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/grades/scale` - Grading scale
//! - `GET /api/policy` - Active promotion thresholds
//! - `POST /api/assessments/grade` - Grade a score
//! - `POST /api/assessments/promotion` - Promotion status from average + failures
//! - `POST /api/assessments/evaluate` - Grade a term assessment
//! - `POST /api/reports/class` - Class summary for a term
//! - `GET /api/calendar/current` - Academic year and term
//!
//! ## Security Configuration
//!
//! Taken from [`AppConfig::security`]: CORS origins, rate limit and an
//! optional API key.

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::{ApiKey, keys_match};
pub use handlers::{
    calendar_handler, class_report_handler, evaluate_handler, grade_handler, health_handler,
    policy_handler, promotion_handler, scale_handler,
};
pub use middleware::{GlobalRateLimiter, create_rate_limiter};
pub use types::{
    CalendarQuery, CalendarResponse, ClassReportRequest, ClassReportResponse, ErrorResponse,
    EvaluateRequest, EvaluateResponse, GradeRequest, GradeResponse, HealthResponse, PolicyResponse,
    PromotionRequest, PromotionResponse, SERVICE_NAME, ScaleResponse, SubjectScoreJson,
    parse_failed_count, parse_score,
};

use crate::config::AppConfig;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use mis_core::{MisError, PromotionPolicy};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (2 MiB).
pub const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared, read-only server state.
#[derive(Clone)]
pub struct AppState {
    /// The configuration the server was started with.
    pub config: Arc<AppConfig>,
    /// Promotion policy built from `config.promotion`.
    pub policy: PromotionPolicy,
}

impl AppState {
    /// Create app state, validating the promotion policy.
    pub fn new(config: AppConfig) -> Result<Self, MisError> {
        let policy = config.policy()?;
        Ok(Self {
            config: Arc::new(config),
            policy,
        })
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from configuration.
///
/// - `["*"]`: allows all origins (development only)
/// - `None`: localhost only
/// - Otherwise: the listed origins; if none parse, localhost only
fn build_cors_layer(origins: Option<&[String]>) -> CorsLayer {
    match origins {
        Some(list) if list.iter().any(|o| o == "*") => {
            tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
            CorsLayer::permissive()
        }
        Some(list) => {
            let allowed_origins: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(hv) => {
                        tracing::info!("CORS: Allowing origin: {}", origin);
                        Some(hv)
                    }
                    Err(e) => {
                        tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                        None
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows the local frontend.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:5173".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:5173".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
/// 5. Authentication (if an API key is configured)
pub fn create_router(state: AppState) -> Router {
    let security = &state.config.security;
    let cors = build_cors_layer(security.cors_origins.as_deref());

    let rate_limiter = if security.rate_limit > 0 {
        tracing::info!(
            "Rate limiting enabled: {} requests/second",
            security.rate_limit
        );
        Some(create_rate_limiter(security.rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let api_key: Option<ApiKey> = state.config.api_key().map(Arc::from);
    if api_key.is_some() {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set MIS_API_KEY or [security] api_key to enable authentication."
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/grades/scale", get(handlers::scale_handler))
        .route("/api/policy", get(handlers::policy_handler))
        .route("/api/assessments/grade", post(handlers::grade_handler))
        .route("/api/assessments/promotion", post(handlers::promotion_handler))
        .route("/api/assessments/evaluate", post(handlers::evaluate_handler))
        .route("/api/reports/class", post(handlers::class_report_handler))
        .route("/api/calendar/current", get(handlers::calendar_handler));

    // Authentication is innermost - runs last on request
    if let Some(key) = api_key {
        router = router.layer(axum_middleware::from_fn_with_state(
            key,
            auth::api_key_auth_middleware,
        ));
    }

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Resolve when Ctrl+C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}

/// Start the HTTP server on `config.server`.
pub async fn run_server(config: AppConfig) -> Result<(), MisError> {
    let addr = config.server.bind_addr();
    let state = AppState::new(config)?;
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MisError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("MIS HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MisError::IoError(format!("Server error: {}", e)))
}

// =============================================================================
// TESTS
// =============================================================================
