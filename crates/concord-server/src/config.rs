//! Configuration for the consolidation server.
//!
//! Settings resolve from a TOML file (`--config path`) or from environment
//! variables (`K`, `LF`, `DAMPENING`, `INFLUENCE`, `STATEFUL`,
//! `BIND_ADDRESS`, `BIND_PORT`), falling back to defaults.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// An environment variable or field holds an unusable value
    #[error("Invalid configuration value for {name}: {value}")]
    InvalidValue {
        /// Setting name
        name: &'static str,
        /// Offending value
        value: String,
    },
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (e.g., 8000)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Number of reputation levels (K, default: 10)
    #[serde(default = "default_levels")]
    pub levels: usize,

    /// Longevity factor in (0, 1] (LF, default: 1 = no aging)
    #[serde(default = "default_longevity_factor")]
    pub longevity_factor: f64,

    /// TruthFinder dampening factor in (0, 1) (default: 0.1)
    #[serde(default = "default_dampening")]
    pub dampening: f64,

    /// TruthFinder related-fact influence in [0, 1] (default: 0.8)
    #[serde(default = "default_influence")]
    pub influence: f64,

    /// Whether reputation persists across requests (default: false)
    #[serde(default)]
    pub stateful: bool,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    8000
}

fn default_levels() -> usize {
    10
}

fn default_longevity_factor() -> f64 {
    1.0
}

fn default_dampening() -> f64 {
    0.1
}

fn default_influence() -> f64 {
    0.8
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            levels: default_levels(),
            longevity_factor: default_longevity_factor(),
            dampening: default_dampening(),
            influence: default_influence(),
            stateful: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from environment variables, using defaults for
    /// anything unset
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = ServerConfig::default();
        if let Ok(value) = std::env::var("BIND_ADDRESS") {
            config.bind_address = value;
        }
        if let Ok(value) = std::env::var("BIND_PORT") {
            config.bind_port = parse_env("BIND_PORT", &value)?;
        }
        if let Ok(value) = std::env::var("K") {
            config.levels = parse_env("K", &value)?;
        }
        if let Ok(value) = std::env::var("LF") {
            config.longevity_factor = parse_env("LF", &value)?;
        }
        if let Ok(value) = std::env::var("DAMPENING") {
            config.dampening = parse_env("DAMPENING", &value)?;
        }
        if let Ok(value) = std::env::var("INFLUENCE") {
            config.influence = parse_env("INFLUENCE", &value)?;
        }
        if let Ok(value) = std::env::var("STATEFUL") {
            config.stateful = value.eq_ignore_ascii_case("true");
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate parameter ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels < 2 {
            return Err(ConfigError::InvalidValue {
                name: "levels",
                value: self.levels.to_string(),
            });
        }
        if !(self.longevity_factor > 0.0 && self.longevity_factor <= 1.0) {
            return Err(ConfigError::InvalidValue {
                name: "longevity_factor",
                value: self.longevity_factor.to_string(),
            });
        }
        if !(self.dampening > 0.0 && self.dampening < 1.0) {
            return Err(ConfigError::InvalidValue {
                name: "dampening",
                value: self.dampening.to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.influence) {
            return Err(ConfigError::InvalidValue {
                name: "influence",
                value: self.influence.to_string(),
            });
        }
        Ok(())
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}
