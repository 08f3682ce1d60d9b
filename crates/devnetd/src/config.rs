//! Configuration file support for devnetd
//!
//! Loads and validates devnetd configuration from TOML files.
//! Default location: /etc/devnet/devnetd.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use devnet_common::{shell::DHCPCD_CMD, DevNetError, DevNetResult};

use crate::led::DEFAULT_LED_CONFIG_PATH;

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/devnet/devnetd.toml";

/// Configuration source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Directories holding `<key>.json` port configuration files
    #[serde(default = "default_port_config_dirs")]
    pub port_config_dirs: Vec<PathBuf>,

    /// Directory holding `<model>.json` legacy model configuration files
    #[serde(default = "default_legacy_config_dir")]
    pub legacy_config_dir: PathBuf,

    /// Manufacturer model whose legacy configuration is accepted
    #[serde(default = "default_manufacturer_model")]
    pub manufacturer_model: String,

    /// Source directory poll interval in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

/// DHCP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DhcpSettings {
    /// Path to the dhcpcd binary
    #[serde(default = "default_dhcp_command")]
    pub command: String,

    /// dhcpcd configuration file passed with `-f`
    #[serde(default = "default_dhcp_config_file")]
    pub config_file: String,

    /// Log commands instead of running them
    #[serde(default)]
    pub dry_run: bool,
}

/// Connectivity indicator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    #[serde(default = "default_led_config_path")]
    pub led_config_path: PathBuf,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Complete devnetd configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub dhcp: DhcpSettings,

    #[serde(default)]
    pub indicator: IndicatorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default functions
fn default_port_config_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("/run/devnet/DevicePortConfig")]
}

fn default_legacy_config_dir() -> PathBuf {
    PathBuf::from("/run/devnet/DeviceNetworkConfig")
}

fn default_manufacturer_model() -> String {
    "default".to_string()
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_dhcp_command() -> String {
    DHCPCD_CMD.to_string()
}

fn default_dhcp_config_file() -> String {
    "/dhcpcd.conf".to_string()
}

fn default_led_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_LED_CONFIG_PATH)
}

fn default_log_level() -> String {
    "info".to_string()
}

// Default implementations
impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            port_config_dirs: default_port_config_dirs(),
            legacy_config_dir: default_legacy_config_dir(),
            manufacturer_model: default_manufacturer_model(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl Default for DhcpSettings {
    fn default() -> Self {
        Self {
            command: default_dhcp_command(),
            config_file: default_dhcp_config_file(),
            dry_run: false,
        }
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            led_config_path: default_led_config_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> DevNetResult<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                DevNetError::invalid_config(
                    path.display().to_string(),
                    format!("failed to parse: {}", e),
                )
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("Config file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(DevNetError::io(path.display().to_string(), e)),
        }
    }

    /// Load from default location or defaults
    pub fn load() -> DevNetResult<Self> {
        Self::load_or_default(DEFAULT_CONFIG_PATH)
    }

    /// Get source poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.sources.poll_interval_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> DevNetResult<()> {
        if self.sources.manufacturer_model.trim().is_empty() {
            return Err(DevNetError::invalid_config(
                "sources.manufacturer_model",
                "must not be empty",
            ));
        }

        if self.sources.poll_interval_ms == 0 {
            return Err(DevNetError::invalid_config(
                "sources.poll_interval_ms",
                "must be > 0",
            ));
        }

        if self.dhcp.command.is_empty() {
            return Err(DevNetError::invalid_config("dhcp.command", "must not be empty"));
        }

        Ok(())
    }
}
