//! Environment-layer configuration under the CLI flags.
//!
//! Resolution is first-non-empty-wins: flag, then `WGPROV__`-prefixed
//! environment variable (with `.env` support).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Settings sourced from the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Provider account and API settings
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Probe tuning
    #[serde(default)]
    pub probe: ProbeSettings,

    /// Logging settings
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    /// Account API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Account username
    #[serde(default)]
    pub username: Option<String>,

    /// Account password
    #[serde(default)]
    pub password: Option<String>,

    /// Trust-anchor certificate path (PEM)
    #[serde(default)]
    pub ca_cert: Option<PathBuf>,

    /// API request timeout
    #[serde(default = "default_api_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeSettings {
    /// Per-connect probe timeout
    #[serde(default = "default_probe_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Concurrent probes
    #[serde(default = "default_probe_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            username: None,
            password: None,
            ca_cert: None,
            timeout: default_api_timeout(),
        }
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: default_probe_timeout(),
            concurrency: default_probe_concurrency(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.vpn-provider.example".into()
}

fn default_api_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(2)
}

fn default_probe_concurrency() -> usize {
    8
}

fn default_log_level() -> String {
    "info".into()
}

impl Settings {
    /// Load settings from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("WGPROV")
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
