//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the TOML file.
//! Every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::resilience::BackoffPolicy;
use crate::store::registration::{default_keys, KeySpec};

/// Root configuration for the resolver service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Bounded wait and retry pacing.
    pub resolution: ResolutionConfig,

    /// Backing store selection.
    pub store: StoreConfig,

    /// Admin API settings.
    pub admin: AdminConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Keys created with an empty value at startup if missing.
    pub registration: Vec<KeySpec>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            resolution: ResolutionConfig::default(),
            store: StoreConfig::default(),
            admin: AdminConfig::default(),
            observability: ObservabilityConfig::default(),
            registration: default_keys(),
        }
    }
}

/// Resolution timing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// How long a caller waits before getting the empty placeholder.
    pub budget_secs: u64,

    /// Delay between unsuccessful fetch attempts.
    pub backoff_secs: u64,

    /// Random extra delay as a fraction of the backoff (0.0 disables).
    pub jitter_ratio: f64,

    /// Share one retry loop per key between concurrent callers.
    pub share_tasks: bool,
}

impl ResolutionConfig {
    pub fn budget(&self) -> Duration {
        Duration::from_secs(self.budget_secs)
    }

    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::fixed(Duration::from_secs(self.backoff_secs)).with_jitter(self.jitter_ratio)
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            budget_secs: 30,
            backoff_secs: 300,
            jitter_ratio: 0.0,
            share_tasks: true,
        }
    }
}

/// Store backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    File,
}

/// Store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// Path of the JSON document for the file backend.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::File,
            path: PathBuf::from("config-entries.json"),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl AdminConfig {
    pub const PLACEHOLDER_KEY: &'static str = "CHANGE_ME_IN_PRODUCTION";
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: Self::PLACEHOLDER_KEY.to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
