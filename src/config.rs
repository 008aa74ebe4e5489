//! Configuration system for twb-monitor
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (TWB_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};

/// Main monitor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Bot endpoint and reconnect settings
    pub endpoint: EndpointSettings,

    /// Terminal display settings
    pub display: DisplaySettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Where the bot's live state is served
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    /// Host (and optional port) of the bot's web interface
    pub host: String,

    /// Path of the push endpoint on that host
    pub path: String,

    /// Use wss:// instead of ws://
    pub secure: bool,

    /// Full URL, overrides host/path/secure when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Fixed delay before each reconnect attempt, in milliseconds
    pub reconnect_delay_ms: u64,

    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
}

/// Terminal display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Clear the terminal before every redraw
    pub clear_screen: bool,

    /// Print the local time of the last redraw next to the status
    pub show_timestamp: bool,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (unset = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1:8080".to_string(),
            path: "/ws".to_string(),
            secure: false,
            url: None,
            reconnect_delay_ms: 1000,
            connect_timeout_ms: 10_000,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            clear_screen: true,
            show_timestamp: true,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl EndpointSettings {
    /// Resolve the push endpoint URL.
    ///
    /// The scheme follows `secure` unless an explicit `url` is configured.
    /// The scheme is not checked here; the transport decides what it supports.
    pub fn resolve_url(&self) -> Result<Url> {
        let raw = match &self.url {
            Some(url) => url.clone(),
            None => {
                let scheme = if self.secure { "wss" } else { "ws" };
                format!("{}://{}{}", scheme, self.host, self.path)
            }
        };

        Url::parse(&raw).map_err(|e| Error::InvalidEndpoint {
            endpoint: raw.clone(),
            message: e.to_string(),
        })
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl MonitorConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            config = Self::from_file(&path)?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;

        Ok(config)
    }

    /// Parse a single TOML file without overrides or validation
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            message: format!("{}: {}", path.display(), e.message()),
            source: Some(e),
        })
    }

    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::config_not_found(path));
        }

        let search_paths = [
            Some(PathBuf::from("twb-monitor.toml")),
            dirs::config_dir().map(|p| p.join("twb").join("monitor.toml")),
            dirs::home_dir().map(|p| p.join(".twb").join("monitor.toml")),
        ];

        for path in search_paths.iter().flatten() {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TWB_HOST") {
            self.endpoint.host = val;
        }
        if let Ok(val) = std::env::var("TWB_PATH") {
            self.endpoint.path = val;
        }
        if let Ok(val) = std::env::var("TWB_SECURE") {
            self.endpoint.secure = parse_flag(&val);
        }
        if let Ok(val) = std::env::var("TWB_URL") {
            self.endpoint.url = Some(val);
        }
        if let Ok(val) = std::env::var("TWB_RECONNECT_DELAY_MS") {
            if let Ok(n) = val.parse() {
                self.endpoint.reconnect_delay_ms = n;
            }
        }
        if let Ok(val) = std::env::var("TWB_CONNECT_TIMEOUT_MS") {
            if let Ok(n) = val.parse() {
                self.endpoint.connect_timeout_ms = n;
            }
        }

        if let Ok(val) = std::env::var("TWB_CLEAR_SCREEN") {
            self.display.clear_screen = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("TWB_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("TWB_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("TWB_LOG_JSON") {
            self.logging.json_format = parse_flag(&val);
        }
    }

    fn expand_paths(&mut self) {
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.url.is_none() {
            if self.endpoint.host.trim().is_empty() {
                return Err(Error::config_field_invalid("endpoint.host", "Endpoint host cannot be empty"));
            }
            if !self.endpoint.path.starts_with('/') {
                return Err(Error::config_field_invalid(
                    "endpoint.path",
                    format!("Endpoint path must start with '/', got '{}'", self.endpoint.path),
                ));
            }
        }

        if self.endpoint.reconnect_delay_ms == 0 {
            return Err(Error::config_field_invalid(
                "endpoint.reconnect_delay_ms",
                "Reconnect delay must be greater than zero",
            ));
        }

        if self.endpoint.connect_timeout_ms == 0 {
            return Err(Error::config_field_invalid(
                "endpoint.connect_timeout_ms",
                "Connect timeout must be greater than zero",
            ));
        }

        // Scheme support is a runtime concern; only syntax is checked here.
        self.endpoint.resolve_url()?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

fn parse_flag(val: &str) -> bool {
    val.eq_ignore_ascii_case("true") || val == "1"
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or(std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Write a commented default configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".twb")
                .join("monitor.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    Ok(config_path)
}

const DEFAULT_CONFIG: &str = r#"# twb-monitor configuration

[endpoint]
# Host (and port) of the bot's web interface
host = "127.0.0.1:8080"

# Push endpoint path on that host
path = "/ws"

# Use wss:// instead of ws://
secure = false

# Full URL, overrides host/path/secure
# url = "ws://127.0.0.1:8080/ws"

# Fixed delay before each reconnect attempt (milliseconds)
reconnect_delay_ms = 1000

# Connection timeout (milliseconds)
connect_timeout_ms = 10000

[display]
# Clear the terminal before every redraw
clear_screen = true

# Show the time of the last redraw
show_timestamp = true

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log file path (comment out to disable file logging)
# file = "~/.twb/logs/monitor.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#;
