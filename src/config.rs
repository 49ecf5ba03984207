//! Configuration management for the PDFToolz server

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request body ceiling in bytes
    pub max_upload_bytes: usize,
    /// Report tool errors with HTTP 200 instead of their own status
    pub legacy_status: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Scratch area for staged uploads
    pub upload_dir: PathBuf,
    /// Output artifacts served by /download
    pub download_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Artifact lifetime in seconds (0 keeps files forever)
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl RetentionConfig {
    /// Lifetime of an artifact, `None` when expiry is disabled
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                max_upload_bytes: 500 * 1024 * 1024,
                legacy_status: false,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("uploads"),
                download_dir: PathBuf::from("downloads"),
            },
            retention: RetentionConfig {
                ttl_secs: 3600,
                sweep_interval_secs: 300,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let max_upload_mb: usize = parse_or(&lookup, "MAX_UPLOAD_MB", 500)?;

        Ok(Config {
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_or(&lookup, "SERVER_PORT", defaults.server.port)?,
                max_upload_bytes: max_upload_mb * 1024 * 1024,
                legacy_status: parse_bool(&lookup, "LEGACY_STATUS", defaults.server.legacy_status)?,
            },
            storage: StorageConfig {
                upload_dir: lookup("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.upload_dir),
                download_dir: lookup("DOWNLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.download_dir),
            },
            retention: RetentionConfig {
                ttl_secs: parse_or(&lookup, "ARTIFACT_TTL_SECS", defaults.retention.ttl_secs)?,
                sweep_interval_secs: parse_or(
                    &lookup,
                    "SWEEP_INTERVAL_SECS",
                    defaults.retention.sweep_interval_secs,
                )?,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn parse_bool<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { key, value }),
        },
        None => Ok(default),
    }
}
