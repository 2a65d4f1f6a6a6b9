use async_trait::async_trait;

use crate::kernel::error::Result;
use crate::plugin_system::context::PluginContext;

/// Core trait that all plugins must implement
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique name of the plugin
    fn name(&self) -> &str;

    /// Semantic version string, e.g. `1.2.0`
    fn version(&self) -> &str;

    /// Names of plugins that must be installed before this one
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Installs the plugin. May register services and middleware through `context`.
    async fn install(&self, context: &PluginContext<'_>) -> Result<()>;

    /// Undoes `install`. The default does nothing.
    async fn uninstall(&self, _context: &PluginContext<'_>) -> Result<()> {
        Ok(())
    }
}
