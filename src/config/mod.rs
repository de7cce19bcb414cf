//! Server configuration
//!
//! Sources, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. TOML file (`paletted.toml` unless another path is given)
//! 3. `PALETTED_*` environment variables
//! 4. `STABILITY_API_KEY` / `REDIS_URL`
//!
//! CLI flags are applied by the binary on top of the extracted config.

use std::net::SocketAddr;
use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stability::DEFAULT_API_URL;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "paletted.toml";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    #[error("STABILITY_API_KEY is missing. Add it to your environment or config file.")]
    MissingApiKey,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listen address
    pub bind_addr: SocketAddr,
    /// SQLite database file; `None` keeps everything in memory
    pub db_path: Option<String>,
    /// Stability AI credential (required to serve)
    pub stability_api_key: Option<String>,
    /// Stability AI generation endpoint
    pub stability_api_url: String,
    /// Optional Redis server for the result cache
    pub redis_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5002)),
            db_path: None, // None = in-memory
            stability_api_key: None,
            stability_api_url: DEFAULT_API_URL.to_string(),
            redis_url: None,
        }
    }
}

impl Config {
    /// Layered figment for a given config file
    pub fn figment(config_file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed("PALETTED_"))
            .merge(Env::raw().only(&["stability_api_key", "redis_url"]))
    }

    /// Load configuration from file and environment
    pub fn load(config_file: &Path) -> Result<Self, ConfigError> {
        Self::figment(config_file)
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// The provider credential, failing when absent or blank
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.stability_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }
}
