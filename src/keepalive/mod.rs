//! Keep-alive pinger.
//!
//! Free-tier Render instances are suspended after a period without inbound
//! traffic. When running in production on Render, this module pings the app's
//! own `/health` endpoint once shortly after startup and then on a fixed
//! interval, so the platform always sees recent traffic.
//!
//! Failures are logged and otherwise ignored; the next tick is the retry.
//! The scheduler is wall-clock driven: every tick spawns its own probe task,
//! so a slow or hung request never delays the following tick.

mod probe;

pub use probe::{ping_health, HealthProbe, HttpHealthProbe, ProbeError, ProbeOutcome};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};

use crate::config::{KeepAliveSettings, ENV_APP_URL, ENV_NODE_ENV, ENV_RENDER, HEALTH_PATH};

/// Deployment environment, from `NODE_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Only the exact value `production` selects production.
    pub fn from_node_env(value: Option<&str>) -> Self {
        match value {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Hosting platform, from the presence of `RENDER`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Render,
    Other,
}

impl HostPlatform {
    /// Any non-empty value of `RENDER` means we are on Render.
    pub fn from_render_flag(value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => HostPlatform::Render,
            _ => HostPlatform::Other,
        }
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostPlatform::Render => write!(f, "Render"),
            HostPlatform::Other => write!(f, "other"),
        }
    }
}

/// Everything the pinger needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepAliveConfig {
    pub environment: Environment,
    pub host_platform: HostPlatform,
    pub base_url: String,
    pub initial_delay: Duration,
    pub interval: Duration,
}

impl KeepAliveConfig {
    /// Resolve from the process environment.
    pub fn from_env(settings: &KeepAliveSettings) -> Self {
        Self::from_lookup(settings, |key| std::env::var(key).ok())
    }

    /// Resolve using `lookup` in place of the process environment.
    ///
    /// An empty `SHOPIFY_APP_URL` counts as unset.
    pub fn from_lookup<F>(settings: &KeepAliveSettings, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_APP_URL)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| settings.default_base_url.clone());

        Self {
            environment: Environment::from_node_env(lookup(ENV_NODE_ENV).as_deref()),
            host_platform: HostPlatform::from_render_flag(lookup(ENV_RENDER).as_deref()),
            base_url,
            initial_delay: Duration::from_secs(settings.initial_delay_seconds),
            interval: Duration::from_secs(settings.interval_seconds),
        }
    }

    /// The pinger only runs in production on Render.
    pub fn is_enabled(&self) -> bool {
        self.environment == Environment::Production && self.host_platform == HostPlatform::Render
    }

    /// Full URL of the health endpoint to ping
    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url.trim().trim_end_matches('/'), HEALTH_PATH)
    }
}

/// Handle to the running pinger. The pinger keeps running if the handle is
/// dropped; call [`KeepAliveHandle::stop`] to shut it down.
#[derive(Debug)]
pub struct KeepAliveHandle {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl KeepAliveHandle {
    /// Stop scheduling pings and abort any probe still in flight.
    pub async fn stop(self) {
        // Err means the scheduler already exited
        let _ = self.stop_tx.send(());
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Keep-alive scheduler ended abnormally");
        }
        tracing::info!("Keep-alive service stopped");
    }

    /// Whether the scheduler task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Start the keep-alive pinger if the configuration enables it.
///
/// Returns `None`, without scheduling anything, outside production on Render.
/// Must be called from within a tokio runtime.
pub fn init(config: &KeepAliveConfig, probe: Arc<dyn HealthProbe>) -> Option<KeepAliveHandle> {
    if !config.is_enabled() {
        tracing::info!(
            environment = %config.environment,
            platform = %config.host_platform,
            "Keep-alive service not started (not on Render production)"
        );
        return None;
    }

    let url = config.health_url();
    tracing::info!(
        url = %url,
        initial_delay_secs = config.initial_delay.as_secs(),
        interval_secs = config.interval.as_secs(),
        "Starting keep-alive service"
    );

    let (stop_tx, stop_rx) = oneshot::channel();
    let task = tokio::spawn(run_scheduler(
        url,
        config.initial_delay,
        config.interval,
        probe,
        stop_rx,
    ));

    Some(KeepAliveHandle { stop_tx, task })
}

/// Fire one probe after `initial_delay` and one every `interval`, both
/// measured from the moment the scheduler starts.
async fn run_scheduler(
    url: String,
    initial_delay: Duration,
    interval: Duration,
    probe: Arc<dyn HealthProbe>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let start = Instant::now();

    let initial = sleep_until(start + initial_delay);
    tokio::pin!(initial);
    let mut initial_pending = true;

    let mut ticker = interval_at(start + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Dropping the set aborts probes still in flight
    let mut probes = JoinSet::new();
    let mut stop_armed = true;

    loop {
        tokio::select! {
            stopped = &mut stop_rx, if stop_armed => {
                if stopped.is_ok() {
                    break;
                }
                // Handle dropped without stop(): keep pinging
                stop_armed = false;
            }
            _ = &mut initial, if initial_pending => {
                initial_pending = false;
                tracing::debug!("Keep-alive initial ping");
                spawn_probe(&mut probes, &probe, &url);
            }
            _ = ticker.tick() => {
                tracing::debug!("Keep-alive scheduled ping");
                spawn_probe(&mut probes, &probe, &url);
            }
            Some(_) = probes.join_next(), if !probes.is_empty() => {}
        }
    }
}

fn spawn_probe(probes: &mut JoinSet<ProbeOutcome>, probe: &Arc<dyn HealthProbe>, url: &str) {
    let probe = Arc::clone(probe);
    let url = url.to_string();
    probes.spawn(async move { ping_health(probe.as_ref(), &url).await });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_environment_requires_exact_production() {
        assert_eq!(
            Environment::from_node_env(Some("production")),
            Environment::Production
        );
        assert_eq!(
            Environment::from_node_env(Some("Production")),
            Environment::Development
        );
        assert_eq!(
            Environment::from_node_env(Some("development")),
            Environment::Development
        );
        assert_eq!(Environment::from_node_env(None), Environment::Development);
    }

    #[test]
    fn test_render_flag_any_non_empty_value() {
        assert_eq!(HostPlatform::from_render_flag(Some("true")), HostPlatform::Render);
        assert_eq!(HostPlatform::from_render_flag(Some("1")), HostPlatform::Render);
        assert_eq!(HostPlatform::from_render_flag(Some("")), HostPlatform::Other);
        assert_eq!(HostPlatform::from_render_flag(None), HostPlatform::Other);
    }

    #[test]
    fn test_from_lookup_enabled_on_render_production() {
        let config = KeepAliveConfig::from_lookup(
            &KeepAliveSettings::default(),
            lookup_from(&[
                ("NODE_ENV", "production"),
                ("RENDER", "true"),
                ("SHOPIFY_APP_URL", "https://x.test"),
            ]),
        );
        assert!(config.is_enabled());
        assert_eq!(config.health_url(), "https://x.test/health");
        assert_eq!(config.initial_delay, Duration::from_secs(30));
        assert_eq!(config.interval, Duration::from_secs(300));
    }

    #[test]
    fn test_from_lookup_disabled_without_render() {
        let config = KeepAliveConfig::from_lookup(
            &KeepAliveSettings::default(),
            lookup_from(&[("NODE_ENV", "production")]),
        );
        assert!(!config.is_enabled());
    }

    #[test]
    fn test_from_lookup_disabled_outside_production() {
        let config = KeepAliveConfig::from_lookup(
            &KeepAliveSettings::default(),
            lookup_from(&[("NODE_ENV", "development"), ("RENDER", "true")]),
        );
        assert!(!config.is_enabled());
    }

    #[test]
    fn test_default_base_url_when_unset_or_empty() {
        let settings = KeepAliveSettings::default();

        let unset = KeepAliveConfig::from_lookup(&settings, lookup_from(&[]));
        assert_eq!(
            unset.health_url(),
            "https://collection-creator.onrender.com/health"
        );

        let empty = KeepAliveConfig::from_lookup(&settings, lookup_from(&[("SHOPIFY_APP_URL", "")]));
        assert_eq!(empty.base_url, settings.default_base_url);
    }

    #[test]
    fn test_health_url_trims_trailing_slash() {
        let config = KeepAliveConfig::from_lookup(
            &KeepAliveSettings::default(),
            lookup_from(&[("SHOPIFY_APP_URL", "https://x.test/")]),
        );
        assert_eq!(config.health_url(), "https://x.test/health");
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Environment::Production.to_string(), "production");
        assert_eq!(HostPlatform::Render.to_string(), "Render");
        assert_eq!(HostPlatform::Other.to_string(), "other");
    }
}
