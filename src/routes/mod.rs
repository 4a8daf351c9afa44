//! HTTP route handlers.
//!
//! Both routes answer with JSON and are marked `no-store` so no intermediary
//! caches an acknowledgement or a stale uptime.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod direct_update;
pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CACHE_CONTROL_NO_STORE;
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Path of the direct-update action
pub const DIRECT_UPDATE_PATH: &str = "/app/direct-update";

/// Creates the Axum router with all routes and cache headers.
pub fn create_router(state: AppState) -> Router {
    // Action route - no authentication, see direct_update module docs
    let action_routes = Router::new().route(DIRECT_UPDATE_PATH, post(direct_update::direct_update));

    // Health check - always fresh for liveness probes and the keep-alive pinger
    let health_routes = Router::new().route("/health", get(health::health));

    Router::new()
        .merge(action_routes)
        .merge(health_routes)
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
        ))
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
