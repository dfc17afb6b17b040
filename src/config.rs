//! Server configuration
//!
//! Loaded once at startup from a YAML file and shared read-only afterwards.
//!
//! ```yaml
//! root_directory: ./www
//! log_level: [info, debug]
//! log_directory: ./logs
//! listen_addr: 127.0.0.1:8080
//! tls_cert: ssl/server.crt
//! tls_key: ssl/server.key
//! cgi_interpreter: php-cgi
//! cgi_args: []
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::Level;

/// Env var naming the config file.
pub const CONFIG_ENV: &str = "WEBROOT_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory the request hosts are appended to
    pub root_directory: String,

    /// Levels written to the log file
    #[serde(default = "default_log_level")]
    pub log_level: Vec<LogLevel>,

    /// Directory holding the daily log files
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// PEM certificate chain; enables TLS together with `tls_key`
    #[serde(default)]
    pub tls_cert: Option<PathBuf>,

    /// PEM private key
    #[serde(default)]
    pub tls_key: Option<PathBuf>,

    /// Program run for dynamic pages
    #[serde(default = "default_cgi_interpreter")]
    pub cgi_interpreter: String,

    /// Arguments passed to the interpreter before anything else
    #[serde(default)]
    pub cgi_args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_level(&self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

fn default_log_level() -> Vec<LogLevel> {
    vec![LogLevel::Info]
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("logs")
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_cgi_interpreter() -> String {
    "php-cgi".to_string()
}

impl Config {
    /// Loads the file named by `WEBROOT_CONFIG` (default `config.yaml`).
    /// `LISTEN` overrides the listen address.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_path(&path)?;

        if let Ok(listen_addr) = std::env::var("LISTEN") {
            config.listen_addr = listen_addr;
        }

        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        Self::from_yaml_str(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config = serde_yaml::from_str(contents)?;
        Ok(config)
    }
}
