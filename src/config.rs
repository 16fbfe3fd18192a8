//! Configuration management for Tollgate.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, TollgateError};
use crate::ratelimit::LimiterConfig;

/// Main configuration for Tollgate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TollgateConfig {
    /// Limiter configuration
    #[serde(default)]
    pub limiter: LimiterSettings,

    /// Simulated traffic configuration
    #[serde(default)]
    pub traffic: TrafficSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Limiter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterSettings {
    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Maximum admissions per identity per window
    #[serde(default = "default_max_per_window")]
    pub max_per_window: u64,
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_per_window: default_max_per_window(),
        }
    }
}

impl LimiterSettings {
    /// Build the limiter configuration, rejecting a zero-length window.
    pub fn to_limiter_config(&self) -> Result<LimiterConfig> {
        LimiterConfig::new(self.window_secs, self.max_per_window)
    }
}

fn default_window_secs() -> u64 {
    5
}

fn default_max_per_window() -> u64 {
    2
}

/// Simulated traffic configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficSettings {
    /// Identities to pick from, uniformly at random
    #[serde(default = "default_identities")]
    pub identities: Vec<String>,

    /// Number of requests to send
    #[serde(default = "default_iterations")]
    pub iterations: u64,

    /// Pause between requests in milliseconds
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,

    /// Seed for identity selection; random when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TrafficSettings {
    fn default() -> Self {
        Self {
            identities: default_identities(),
            iterations: default_iterations(),
            pause_ms: default_pause_ms(),
            seed: None,
        }
    }
}

fn default_identities() -> Vec<String> {
    ["A", "B", "C"].iter().map(|s| s.to_string()).collect()
}

fn default_iterations() -> u64 {
    1000
}

fn default_pause_ms() -> u64 {
    250
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TollgateConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| TollgateError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Check the configuration for values the limiter or traffic driver cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.limiter.to_limiter_config()?;

        if self.traffic.identities.is_empty() {
            return Err(TollgateError::Config(
                "traffic.identities must not be empty".to_string(),
            ));
        }
        if self.traffic.identities.iter().any(|id| id.is_empty()) {
            return Err(TollgateError::Config(
                "traffic.identities must not contain empty strings".to_string(),
            ));
        }

        Ok(())
    }
}
