//! # Keel Configuration Errors
use std::path::PathBuf;

use thiserror::Error;

use crate::kernel::error::{Classify, ErrorCategory, ErrorSeverity};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported config format for {path} (expected one of: {supported})")]
    UnsupportedFormat { path: PathBuf, supported: String },

    #[error("Failed to parse {format} config: {message}")]
    Parse { format: &'static str, message: String },

    #[error("Failed to serialize config as {format}: {message}")]
    Serialize { format: &'static str, message: String },

    #[error("Invalid setting '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl Classify for ConfigError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Config
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            ConfigError::Parse { .. } | ConfigError::UnsupportedFormat { .. } => ErrorSeverity::High,
            _ => ErrorSeverity::Medium,
        }
    }

    fn code(&self) -> &str {
        match self {
            ConfigError::Io { .. } => "CONFIG_IO",
            ConfigError::UnsupportedFormat { .. } => "CONFIG_UNSUPPORTED_FORMAT",
            ConfigError::Parse { .. } => "CONFIG_PARSE",
            ConfigError::Serialize { .. } => "CONFIG_SERIALIZE",
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE",
        }
    }
}
