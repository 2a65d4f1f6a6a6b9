//! # Keel Plugin System Errors
//!
//! Defines [`PluginSystemError`], covering registration checks (duplicate
//! names, malformed versions, missing dependencies), removal checks and
//! failures raised by a plugin's own install or uninstall hook.
use thiserror::Error;

use crate::kernel::error::{Classify, Error as KernelError, ErrorCategory, ErrorSeverity};

#[derive(Debug, Error)]
pub enum PluginSystemError {
    #[error("Plugin '{plugin}' is already installed")]
    AlreadyInstalled { plugin: String },

    #[error("Plugin '{plugin}' has an invalid version '{version}': {source}")]
    InvalidVersion {
        plugin: String,
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("Plugin '{plugin}' requires plugins that are not installed: {}", .missing.join(", "))]
    DependencyMissing { plugin: String, missing: Vec<String> },

    #[error("Plugin '{plugin}' is not installed")]
    NotInstalled { plugin: String },

    #[error("Plugin '{plugin}' is still required by: {}", .dependents.join(", "))]
    HasDependents { plugin: String, dependents: Vec<String> },

    #[error("Plugin '{plugin}' failed to install: {source}")]
    InstallFailed {
        plugin: String,
        #[source]
        source: Box<KernelError>,
    },

    #[error("Plugin '{plugin}' failed to uninstall: {source}")]
    UninstallFailed {
        plugin: String,
        #[source]
        source: Box<KernelError>,
    },
}

impl Classify for PluginSystemError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Plugin
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            PluginSystemError::InstallFailed { source, .. }
            | PluginSystemError::UninstallFailed { source, .. } => source.severity(),
            PluginSystemError::DependencyMissing { .. } => ErrorSeverity::High,
            _ => ErrorSeverity::Medium,
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            PluginSystemError::InstallFailed { source, .. }
            | PluginSystemError::UninstallFailed { source, .. } => source.is_recoverable(),
            _ => true,
        }
    }

    fn code(&self) -> &str {
        match self {
            PluginSystemError::AlreadyInstalled { .. } => "PLUGIN_ALREADY_INSTALLED",
            PluginSystemError::InvalidVersion { .. } => "INVALID_VERSION",
            PluginSystemError::DependencyMissing { .. } => "DEPENDENCY_MISSING",
            PluginSystemError::NotInstalled { .. } => "PLUGIN_NOT_INSTALLED",
            PluginSystemError::HasDependents { .. } => "PLUGIN_HAS_DEPENDENTS",
            PluginSystemError::InstallFailed { .. } => "INSTALL_FAILED",
            PluginSystemError::UninstallFailed { .. } => "UNINSTALL_FAILED",
        }
    }
}
