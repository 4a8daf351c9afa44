//! Configuration loading and constants.
//!
//! Loads application configuration from TOML files and defines constants for
//! the keep-alive pinger, the direct-update responses, logging and default
//! paths. `AppConfig` is the root configuration struct containing all settings.

use serde::Deserialize;
use std::path::Path;

// =============================================================================
// Keep-Alive Constants
// =============================================================================

/// Delay before the one-shot startup ping (30 seconds)
pub const KEEP_ALIVE_INITIAL_DELAY_SECS: u64 = 30;

/// Interval between recurring pings (5 minutes)
pub const KEEP_ALIVE_INTERVAL_SECS: u64 = 300;

/// User-Agent sent with every health probe
pub const KEEP_ALIVE_USER_AGENT: &str = "Collection-Creator-KeepAlive/1.0";

/// Path appended to the base URL for the health probe
pub const HEALTH_PATH: &str = "/health";

/// Base URL used when `SHOPIFY_APP_URL` is not set
pub const DEFAULT_APP_URL: &str = "https://collection-creator.onrender.com";

// =============================================================================
// Environment Variables
// =============================================================================

/// Deployment environment; must equal `production` for the pinger to run
pub const ENV_NODE_ENV: &str = "NODE_ENV";

/// Set by the Render platform on its hosts
pub const ENV_RENDER: &str = "RENDER";

/// Public base URL of this app
pub const ENV_APP_URL: &str = "SHOPIFY_APP_URL";

/// Listening port assigned by the hosting platform
pub const ENV_PORT: &str = "PORT";

// =============================================================================
// HTTP Response Headers
// =============================================================================

/// Neither the action acknowledgement nor the health payload may be cached
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "collection_creator=debug,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "collection-creator";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    pub http: HttpServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Keep-alive pinger timing and fallback URL
    #[serde(default)]
    pub keep_alive: KeepAliveSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    /// Whether structured JSON output was requested
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Keep-alive pinger settings from the config file.
///
/// Whether the pinger runs at all is decided by the process environment, see
/// [`crate::keepalive::KeepAliveConfig::from_env`].
#[derive(Debug, Clone, Deserialize)]
pub struct KeepAliveSettings {
    /// Seconds before the first ping (default: 30)
    #[serde(default = "KeepAliveSettings::default_initial_delay")]
    pub initial_delay_seconds: u64,
    /// Seconds between recurring pings (default: 300)
    #[serde(default = "KeepAliveSettings::default_interval")]
    pub interval_seconds: u64,
    /// Base URL when SHOPIFY_APP_URL is unset
    #[serde(default = "KeepAliveSettings::default_base_url")]
    pub default_base_url: String,
}

impl Default for KeepAliveSettings {
    fn default() -> Self {
        Self {
            initial_delay_seconds: Self::default_initial_delay(),
            interval_seconds: Self::default_interval(),
            default_base_url: Self::default_base_url(),
        }
    }
}

impl KeepAliveSettings {
    fn default_initial_delay() -> u64 {
        KEEP_ALIVE_INITIAL_DELAY_SECS
    }

    fn default_interval() -> u64 {
        KEEP_ALIVE_INTERVAL_SECS
    }

    fn default_base_url() -> String {
        DEFAULT_APP_URL.to_string()
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply the `PORT` override
    /// from the process environment.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_with_port(path, std::env::var(ENV_PORT).ok().as_deref())
    }

    /// Load configuration from a TOML file, then apply `port` if given.
    pub fn load_with_port<P: AsRef<Path>>(path: P, port: Option<&str>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&contents)?;
        config.apply_port_override(port)?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;

        // tokio intervals panic on a zero period
        if config.keep_alive.interval_seconds == 0 {
            return Err(ConfigError::Validation(
                "keep_alive.interval_seconds must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }

    /// Replace `http.port` with the platform-assigned port, if one is given.
    pub fn apply_port_override(&mut self, port: Option<&str>) -> Result<(), ConfigError> {
        let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) else {
            return Ok(());
        };

        self.http.port = port.parse().map_err(|_| {
            ConfigError::Validation(format!("{} is not a valid port: {:?}", ENV_PORT, port))
        })?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
