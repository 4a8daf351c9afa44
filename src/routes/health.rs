//! Health check endpoint.
//!
//! Liveness probe for the hosting platform and the target of the keep-alive
//! pinger. Always returns 200 with a small JSON document including process
//! uptime; it does not check any downstream dependency.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SERVICE_NAME;
use crate::state::AppState;

/// Body of `GET /health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub service: String,
    pub platform: String,
    pub environment: String,
    pub timestamp: DateTime<Utc>,
    /// Process uptime in seconds
    pub uptime: f64,
}

/// Health check handler.
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        platform: state.host_platform.to_string(),
        environment: state.environment.to_string(),
        timestamp: Utc::now(),
        uptime: state.uptime_seconds(),
    })
}
