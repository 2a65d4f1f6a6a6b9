use std::sync::Arc;

use semver::Version;

use crate::kernel::error::{Error, Result};
use crate::plugin_system::context::PluginContext;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::Plugin;
use crate::recovery::{ErrorRecoveryManager, Outcome};

/// Installs plugins in dependency order and keeps them in install order.
pub struct PluginSystem {
    plugins: Vec<Arc<dyn Plugin>>,
    recovery: Arc<ErrorRecoveryManager>,
}

impl PluginSystem {
    pub fn new(recovery: Arc<ErrorRecoveryManager>) -> Self {
        Self {
            plugins: Vec::new(),
            recovery,
        }
    }

    /// Installs a plugin.
    ///
    /// Name, version and dependencies are all checked before `install` runs, so
    /// a rejected plugin never partially installs. A failing `install` is routed
    /// through the recovery manager: if it recovers the call reports
    /// [`Outcome::Recovered`] and the plugin stays uninstalled.
    pub async fn use_plugin(&mut self, plugin: Arc<dyn Plugin>, context: &PluginContext<'_>) -> Result<Outcome> {
        let name = plugin.name().to_string();

        if self.has(&name) {
            return Err(PluginSystemError::AlreadyInstalled { plugin: name }.into());
        }

        Version::parse(plugin.version()).map_err(|source| PluginSystemError::InvalidVersion {
            plugin: name.clone(),
            version: plugin.version().to_string(),
            source,
        })?;

        let missing: Vec<String> = plugin
            .dependencies()
            .into_iter()
            .filter(|dep| !self.has(dep))
            .collect();
        if !missing.is_empty() {
            return Err(PluginSystemError::DependencyMissing { plugin: name, missing }.into());
        }

        log::info!("Installing plugin {} v{}", name, plugin.version());
        match plugin.install(context).await {
            Ok(()) => {
                self.plugins.push(plugin);
                log::info!("Plugin {} installed", name);
                Ok(Outcome::Completed)
            }
            Err(err) => {
                log::error!("Plugin {} failed to install: {}", name, err);
                if self.recovery.recover(&err).await {
                    log::warn!("Install failure of plugin {} was recovered; plugin is not installed", name);
                    Ok(Outcome::Recovered)
                } else {
                    Err(PluginSystemError::InstallFailed {
                        plugin: name,
                        source: Box::new(err),
                    }
                    .into())
                }
            }
        }
    }

    /// Uninstalls a plugin no other installed plugin depends on.
    ///
    /// If the plugin's own hook fails the plugin stays installed.
    pub async fn uninstall(&mut self, name: &str, context: &PluginContext<'_>) -> Result<()> {
        let plugin = self
            .get(name)
            .ok_or_else(|| PluginSystemError::NotInstalled { plugin: name.to_string() })?;

        let dependents = self.dependents_of(name);
        if !dependents.is_empty() {
            return Err(PluginSystemError::HasDependents {
                plugin: name.to_string(),
                dependents,
            }
            .into());
        }

        log::info!("Uninstalling plugin {}", name);
        plugin
            .uninstall(context)
            .await
            .map_err(|err| PluginSystemError::UninstallFailed {
                plugin: name.to_string(),
                source: Box::new(err),
            })?;

        self.plugins.retain(|p| p.name() != name);
        Ok(())
    }

    /// Uninstalls everything in reverse install order, so dependents always go
    /// before their dependencies. Keeps going past failures and returns the
    /// first one.
    pub async fn uninstall_all(&mut self, context: &PluginContext<'_>) -> Result<()> {
        let names: Vec<String> = self.plugins.iter().rev().map(|p| p.name().to_string()).collect();
        let mut first_error: Option<Error> = None;

        for name in names {
            if let Err(err) = self.uninstall(&name, context).await {
                log::error!("Error uninstalling plugin {}: {}", name, err);
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.iter().find(|p| p.name() == name).cloned()
    }

    /// Installed plugins, in install order.
    pub fn get_all(&self) -> Vec<Arc<dyn Plugin>> {
        self.plugins.clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.name().to_string()).collect()
    }

    /// Installed plugins that declare `name` as a dependency.
    pub fn dependents_of(&self, name: &str) -> Vec<String> {
        self.plugins
            .iter()
            .filter(|p| p.dependencies().iter().any(|d| d == name))
            .map(|p| p.name().to_string())
            .collect()
    }

    pub fn size(&self) -> usize {
        self.plugins.len()
    }
}
