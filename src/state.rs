//! Shared application state for request handlers.

use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;
use crate::keepalive::{Environment, HostPlatform};

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Contains the application configuration, the process start instant used to
/// report uptime, and the deployment environment the process detected.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub started_at: Instant,
    pub environment: Environment,
    pub host_platform: HostPlatform,
}

impl AppState {
    /// Creates a new application state, recording now as the start instant.
    pub fn new(config: AppConfig, environment: Environment, host_platform: HostPlatform) -> Self {
        Self {
            config: Arc::new(config),
            started_at: Instant::now(),
            environment,
            host_platform,
        }
    }

    /// Seconds since the state was created.
    pub fn uptime_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
