//! Health probe: one GET against the health endpoint, reduced to an outcome.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::USER_AGENT;
use serde::Deserialize;

use crate::config::KEEP_ALIVE_USER_AGENT;

/// Error type for probe setup
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result of a single health probe. Probes never fail with an error; every
/// failure mode is one of these variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// 2xx with a JSON body
    Healthy {
        checked_at: DateTime<Utc>,
        /// `uptime` from the body as sent; only its presence is checked
        uptime: Option<serde_json::Value>,
    },
    /// Non-2xx status
    Unhealthy { status: u16 },
    /// Transport error or unreadable body
    Failed { error: String },
}

impl ProbeOutcome {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeOutcome::Healthy { .. })
    }
}

/// Anything that can check a health URL.
#[async_trait]
pub trait HealthProbe: Send + Sync + 'static {
    async fn check(&self, url: &str) -> ProbeOutcome;
}

#[derive(Debug, Deserialize)]
struct HealthPayload {
    uptime: Option<serde_json::Value>,
}

/// Probe backed by a `reqwest` client.
///
/// No timeout is set beyond the client's own defaults.
#[derive(Clone, Debug)]
pub struct HttpHealthProbe {
    client: reqwest::Client,
}

impl HttpHealthProbe {
    pub fn new() -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn check(&self, url: &str) -> ProbeOutcome {
        let response = match self
            .client
            .get(url)
            .header(USER_AGENT, KEEP_ALIVE_USER_AGENT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return ProbeOutcome::Failed { error: e.to_string() },
        };

        let status = response.status();
        if !status.is_success() {
            return ProbeOutcome::Unhealthy {
                status: status.as_u16(),
            };
        }

        match response.json::<HealthPayload>().await {
            Ok(payload) => ProbeOutcome::Healthy {
                checked_at: Utc::now(),
                uptime: payload.uptime,
            },
            Err(e) => ProbeOutcome::Failed {
                error: format!("invalid health response: {}", e),
            },
        }
    }
}

/// Probe `url` once and log the outcome.
pub async fn ping_health(probe: &dyn HealthProbe, url: &str) -> ProbeOutcome {
    let outcome = probe.check(url).await;

    match &outcome {
        ProbeOutcome::Healthy { checked_at, uptime } => {
            if uptime.is_none() {
                tracing::warn!(url = %url, "Keep-alive health response has no uptime");
            }
            tracing::info!(
                url = %url,
                checked_at = %checked_at.to_rfc3339(),
                uptime = ?uptime,
                "Keep-alive health check successful"
            );
        }
        ProbeOutcome::Unhealthy { status } => {
            tracing::error!(url = %url, status, "Keep-alive health check failed");
        }
        ProbeOutcome::Failed { error } => {
            tracing::error!(url = %url, error = %error, "Keep-alive error pinging health endpoint");
        }
    }

    outcome
}
