//! Routewise API
//!
//! Back-office HTTP service for payment recovery and coverage risk.
//!
//! ## REST Endpoints
//!
//! - `GET /api/admin/payments/failed` - Failed payments with their next retry
//! - `POST /api/admin/payments/{id}/cancel-retries` - Stop retrying and cut the customer off
//! - `POST /api/admin/payments/retries/run` - Run the retry job now
//! - `GET /api/admin/coverage/risk` - Zips with customers but no coverage
//! - `POST /api/admin/coverage/risk/notify` - Email the coverage-risk digest
//! - `POST /api/auth/refresh` - Re-issue the session cookie
//! - `POST /webhooks/payments` - Payment processor webhook handler
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;
pub mod worker;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use routewise_axum::{rate_limit, AuthLayer};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use crate::config::{Config, ConfigError};
pub use crate::state::AppState;

/// Build the HTTP router
pub fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();

    // Admin routes
    let admin = Router::new()
        .route("/payments/failed", get(handlers::list_failed_payments))
        .route("/payments/retries/run", post(handlers::run_retries))
        .route(
            "/payments/{id}/cancel-retries",
            post(handlers::cancel_retries),
        )
        .route("/coverage/risk", get(handlers::coverage_risk))
        .route("/coverage/risk/notify", post(handlers::notify_coverage_risk));

    let api = Router::new()
        .nest("/admin", admin)
        .route("/auth/refresh", post(handlers::refresh))
        .layer(AuthLayer::new(state.tokens.clone()));

    // Webhook route (separate - uses raw body, no auth)
    let webhook_routes =
        Router::new().route("/webhooks/payments", post(handlers::payment_webhook));

    // Health routes (no timeout, no rate limit)
    let health_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready));

    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Outermost first
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .nest("/api", api)
        .merge(webhook_routes)
        .layer(from_fn_with_state(state.limiter.clone(), rate_limit))
        .layer(middleware)
        .merge(health_routes)
        .merge(metrics_route)
        .with_state(state)
}
