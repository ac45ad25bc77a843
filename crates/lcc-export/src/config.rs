//! Configuration file loading for the exporter and the capture server.
//!
//! Settings live in `lcc.toml` in the working directory. Every key is
//! optional; a missing file yields the defaults.

use lcc_core::CaptureFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Listen address of the capture server.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Defaults to `127.0.0.1`: the only expected client is a local browser.
    #[serde(default = "default_host")]
    pub host: String,
    /// Defaults to 3000.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port`, as accepted by `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Top-level configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LccConfig {
    /// Directory exports are written to. Defaults to `exports`.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Which URLs count as viewer data when replaying captures.
    #[serde(default)]
    pub capture: CaptureFilter,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("exports")
}

impl Default for LccConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            capture: CaptureFilter::default(),
            server: ServerConfig::default(),
        }
    }
}

impl LccConfig {
    /// Loads the configuration from [`Self::config_path()`].
    ///
    /// If the file does not exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads the configuration from an explicit path, falling back to the
    /// defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns `lcc.toml` in the current working directory.
    pub fn config_path() -> PathBuf {
        PathBuf::from("lcc.toml")
    }
}
