//! Configuration management for the Atlan client
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (atlan.toml)
//! - Environment variables (ATLAN__*)
//!
//! ## Example config file (atlan.toml):
//! ```toml
//! [client]
//! base_url = "https://tenant.atlan.com"
//! api_token = "..."
//! timeout_secs = 30
//!
//! [retry]
//! max_network_retries = 3
//! async_max_retries = 20
//! initial_delay_ms = 500
//! max_delay_ms = 5000
//! multiplier = 2.0
//! jitter_ms = 250
//!
//! [lineage]
//! depth = 1000000
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::retry::{Backoff, MAX_ASYNC_RETRIES, MAX_NETWORK_RETRIES};

/// Main client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AtlanConfig {
    /// Connection settings
    #[serde(default)]
    pub client: ClientConfig,

    /// Polling and backoff settings
    #[serde(default)]
    pub retry: RetryConfig,

    /// Lineage request defaults
    #[serde(default)]
    pub lineage: LineageConfig,
}

/// Connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Tenant URL, e.g. https://tenant.atlan.com
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Ceiling for network retries, also used when confirming deletions
    #[serde(default = "default_max_network_retries")]
    pub max_network_retries: u32,

    /// Ceiling when waiting on asynchronous server-side work
    #[serde(default = "default_async_max_retries")]
    pub async_max_retries: u32,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
}

/// Lineage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageConfig {
    /// Default number of hops to request
    #[serde(default = "default_depth")]
    pub depth: u32,

    /// Include processes that have been soft-deleted
    #[serde(default)]
    pub allow_deleted_process: bool,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:21000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_network_retries() -> u32 {
    MAX_NETWORK_RETRIES
}

fn default_async_max_retries() -> u32 {
    MAX_ASYNC_RETRIES
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    5_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_jitter_ms() -> u64 {
    250
}

fn default_depth() -> u32 {
    1_000_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_network_retries: default_max_network_retries(),
            async_max_retries: default_async_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
            jitter_ms: default_jitter_ms(),
        }
    }
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            allow_deleted_process: false,
        }
    }
}

impl RetryConfig {
    /// Backoff schedule described by this configuration
    pub fn backoff(&self) -> Backoff {
        Backoff {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            multiplier: self.multiplier,
            jitter: Duration::from_millis(self.jitter_ms),
        }
    }
}

impl AtlanConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = ["atlan.toml", ".atlan.toml", "config/atlan.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("com", "atlan", "atlan") {
            let xdg_config = config_dir.config_dir().join("atlan.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (ATLAN__*)
        builder = builder.add_source(
            Environment::with_prefix("ATLAN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
