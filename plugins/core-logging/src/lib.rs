//! # core-logging
//!
//! Logging for Keel hosts. [`init_subscriber`] installs a process-wide
//! `tracing` subscriber that also receives `log` records, and
//! [`LoggingPlugin`] does the same at plugin install time, registering a
//! [`Logger`] service and the [`RequestLogMiddleware`] along the way.
mod logger;
mod middleware;
mod subscriber;

use std::sync::Arc;

use async_trait::async_trait;
use keel_core::kernel::constants::KERNEL_NAME;
use keel_core::kernel::error::Result as KernelResult;
use keel_core::{Plugin, PluginContext};
use serde::Deserialize;

pub use logger::{LOGGER, Logger};
pub use middleware::RequestLogMiddleware;
pub use subscriber::init_subscriber;

/// Settings read from `plugins."core-logging"` in the kernel config. Unset
/// fields fall back to the kernel's `logging` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub json: Option<bool>,
    /// Register [`RequestLogMiddleware`].
    pub request_log: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: None,
            json: None,
            request_log: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct LoggingPlugin;

impl LoggingPlugin {
    pub const NAME: &'static str = "core-logging";
}

#[async_trait]
impl Plugin for LoggingPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    async fn install(&self, context: &PluginContext<'_>) -> KernelResult<()> {
        let config = context.config();
        let settings: LoggingSettings = config.plugin_settings(Self::NAME).unwrap_or_default();
        let level = settings.level.as_deref().unwrap_or(config.logging.level.as_str());
        let json = settings.json.unwrap_or(config.logging.json);

        if !init_subscriber(level, json)? {
            log::debug!("A global subscriber is already installed, keeping it");
        }

        let container = context.container();
        container.register_instance(&LOGGER, Logger::new(KERNEL_NAME))?;

        if settings.request_log {
            if let Err(err) = context.pipeline().use_middleware(Arc::new(RequestLogMiddleware::new())) {
                container.unregister(LOGGER.name());
                return Err(err);
            }
        }

        log::info!("Core logging installed (level: {}, json: {})", level, json);
        Ok(())
    }

    async fn uninstall(&self, context: &PluginContext<'_>) -> KernelResult<()> {
        context.pipeline().remove(RequestLogMiddleware::NAME);
        context.container().unregister(LOGGER.name());
        log::info!("Core logging uninstalled");
        Ok(())
    }
}
