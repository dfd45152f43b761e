//! HTTP API for the to-do service.
//!
//! Exposes CRUD endpoints under `/todo`, each backed by a decorated request
//! pipeline, with structured logging (tracing), Prometheus metrics, CORS,
//! per-client rate limiting, and a request timeout.

pub mod config;
pub mod error;
pub mod identity;
pub mod rate_limit;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use config::Config;
use rate_limit::RateLimiter;
pub use state::{AppState, TodoStore};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: AppState, metrics_handle: PrometheusHandle, config: &Config) -> Router {
    let state = Arc::new(state);
    let limiter = RateLimiter::new(config.rate_limit.clone());

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let todo_router = Router::new()
        .route(
            "/todo",
            get(routes::todos::list)
                .post(routes::todos::create)
                .patch(routes::todos::update),
        )
        .route(
            "/todo/{id}",
            get(routes::todos::get).delete(routes::todos::delete),
        )
        .route_layer(middleware::from_fn_with_state(limiter, rate_limit::limit));

    Router::new()
        .route("/health", get(routes::health::check))
        .merge(todo_router)
        .with_state(state)
        .merge(metrics_router)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
