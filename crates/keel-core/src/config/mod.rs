//! # Keel Kernel Configuration
//!
//! [`KernelConfig`] holds the host's kernel settings: recovery limits, the
//! logging level, a manifest of managers and free-form per-plugin settings.
//! It can be read from JSON, YAML (`yaml-config` feature) or TOML
//! (`toml-config` feature); the format follows the file extension.
pub mod error;

use std::collections::HashMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::kernel::constants::{DEFAULT_HISTORY_LIMIT, DEFAULT_LOG_LEVEL, DEFAULT_MAX_RETRIES};
pub use error::ConfigError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    fn supported() -> String {
        let mut names = vec!["json"];
        #[cfg(feature = "yaml-config")]
        names.extend(["yaml", "yml"]);
        #[cfg(feature = "toml-config")]
        names.push("toml");
        names.join(", ")
    }
}

/// Settings of the error recovery manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Outcomes kept before the oldest is evicted.
    pub history_limit: usize,
    /// Attempts for a RETRY strategy registered without a count.
    pub default_max_retries: u32,
    /// Pause between RETRY attempts, in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            default_max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `keel_core=debug,warn`.
    pub level: String,
    /// Emit JSON lines instead of human readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json: false,
        }
    }
}

/// A manager declaration in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerSpec {
    pub name: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub lazy: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub recovery: RecoveryConfig,
    pub logging: LoggingConfig,
    pub managers: Vec<ManagerSpec>,
    /// Per-plugin settings keyed by plugin name.
    pub plugins: HashMap<String, serde_json::Value>,
}

impl KernelConfig {
    /// Reads a config file, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
            supported: ConfigFormat::supported(),
        })?;
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loading {} kernel config from {}", format.extension(), path.display());
        Self::from_str(&data, format)
    }

    pub fn from_str(data: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let parse_error = |message: String| ConfigError::Parse {
            format: format.extension(),
            message,
        };
        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| parse_error(e.to_string()))?,
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| parse_error(e.to_string()))?,
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| parse_error(e.to_string()))?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_string(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        let serialize_error = |message: String| ConfigError::Serialize {
            format: format.extension(),
            message,
        };
        match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self).map_err(|e| serialize_error(e.to_string())),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(self).map_err(|e| serialize_error(e.to_string())),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| serialize_error(e.to_string())),
        }
    }

    /// Rejects settings the kernel cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recovery.history_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "recovery.history_limit".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if let Some(spec) = self.managers.iter().find(|m| m.name.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                key: "managers".to_string(),
                message: format!("manager with empty name (dependencies: {:?})", spec.dependencies),
            });
        }
        Ok(())
    }

    /// A plugin's settings section, deserialized. `None` if absent or of the
    /// wrong shape.
    pub fn plugin_settings<T: DeserializeOwned>(&self, plugin: &str) -> Option<T> {
        self.plugins
            .get(plugin)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}
