use std::sync::Arc;

use crate::config::KernelConfig;
use crate::di::{DiContainer, DiError, Token};
use crate::kernel::component::ComponentRegistry;
use crate::kernel::constants;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::manager::{Manager, ManagerError, ManagerRegistry};
use crate::middleware::{MiddlewareContext, MiddlewarePipeline};
use crate::plugin_system::{Plugin, PluginContext, PluginSystem};
use crate::recovery::{ErrorRecoveryManager, Outcome};

/// Hosts one of each subsystem and drives their lifecycle.
///
/// Typical use: register managers, [`bootstrap`](Kernel::bootstrap), install
/// plugins with [`use_plugin`](Kernel::use_plugin), then push requests through
/// [`execute`](Kernel::execute). [`shutdown`](Kernel::shutdown) tears down in
/// reverse.
pub struct Kernel {
    config: KernelConfig,
    managers: ManagerRegistry,
    components: ComponentRegistry,
    plugins: PluginSystem,
    container: DiContainer,
    pipeline: MiddlewarePipeline,
    recovery: Arc<ErrorRecoveryManager>,
    bootstrapped: bool,
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel {
    pub fn new() -> Self {
        Self::with_config(KernelConfig::default())
    }

    pub fn with_config(config: KernelConfig) -> Self {
        log::info!("Creating {} kernel v{}", constants::KERNEL_NAME, constants::KERNEL_VERSION);
        let recovery = Arc::new(ErrorRecoveryManager::from_config(&config.recovery));
        Self {
            plugins: PluginSystem::new(recovery.clone()),
            recovery,
            config,
            managers: ManagerRegistry::new(),
            components: ComponentRegistry::new(),
            container: DiContainer::new(),
            pipeline: MiddlewarePipeline::new(),
            bootstrapped: false,
        }
    }

    /// Adds a manager. A second manager with the same name is ignored.
    pub fn register_manager(&mut self, manager: Arc<dyn Manager>) {
        if !self.components.register(manager.clone()) {
            log::warn!("Manager '{}' is already registered with the kernel, ignoring", manager.name());
            return;
        }
        self.managers.register_manager(manager.as_ref());
    }

    /// Initializes every eager manager in dependency order.
    pub async fn bootstrap(&mut self) -> Result<()> {
        if self.bootstrapped {
            return Err(Error::lifecycle(
                KernelLifecyclePhase::Bootstrap,
                None,
                "Kernel already bootstrapped",
                None,
            ));
        }

        let order = self.managers.get_initialization_order()?;
        log::info!("Bootstrapping {} manager(s): {:?}", order.len(), order);
        for name in &order {
            self.initialize_with_dependencies(name).await?;
        }

        self.bootstrapped = true;
        log::info!("Kernel bootstrap complete");
        Ok(())
    }

    /// Initializes a (typically lazy) manager together with whatever it
    /// depends on, and returns it.
    pub async fn ensure_manager(&mut self, name: &str) -> Result<Arc<dyn Manager>> {
        if !self.managers.has(name) {
            return Err(ManagerError::NotRegistered { name: name.to_string() }.into());
        }
        self.initialize_with_dependencies(name).await?;
        self.components
            .get(name)
            .ok_or_else(|| ManagerError::NotRegistered { name: name.to_string() }.into())
    }

    /// Lazy dependencies of `name` are pulled in here as well.
    async fn initialize_with_dependencies(&mut self, name: &str) -> Result<()> {
        for step in self.managers.initialization_path(name)? {
            self.initialize_manager(&step).await?;
        }
        Ok(())
    }

    async fn initialize_manager(&mut self, name: &str) -> Result<()> {
        if self.managers.is_initialized(name) {
            return Ok(());
        }

        let check = self.managers.check_dependencies(name)?;
        if !check.satisfied {
            return Err(ManagerError::DependenciesNotReady {
                name: name.to_string(),
                missing: check.missing,
            }
            .into());
        }

        let manager = self
            .components
            .get(name)
            .ok_or_else(|| ManagerError::NotRegistered { name: name.to_string() })?;

        log::info!("Initializing manager: {}", name);
        match manager.initialize().await {
            Ok(()) => {
                self.managers.mark_initialized(name, None)?;
                Ok(())
            }
            Err(err) => {
                let message = format!("Manager failed to initialize: {}", err);
                self.managers.mark_initialized(name, Some(err))?;
                Err(Error::lifecycle(KernelLifecyclePhase::Initialize, Some(name), message, None))
            }
        }
    }

    /// Installs a plugin. See [`PluginSystem::use_plugin`].
    pub async fn use_plugin(&mut self, plugin: Arc<dyn Plugin>) -> Result<Outcome> {
        let context = PluginContext::new(
            &self.container,
            &self.pipeline,
            &self.recovery,
            &self.config,
            &self.components,
            &self.managers,
        );
        self.plugins.use_plugin(plugin, &context).await
    }

    pub async fn uninstall_plugin(&mut self, name: &str) -> Result<()> {
        let context = PluginContext::new(
            &self.container,
            &self.pipeline,
            &self.recovery,
            &self.config,
            &self.components,
            &self.managers,
        );
        self.plugins.uninstall(name, &context).await
    }

    /// Runs the middleware pipeline. A failure is handed to the recovery
    /// manager; only unrecovered errors reach the caller.
    pub async fn execute(&self, ctx: &mut MiddlewareContext) -> Result<Outcome> {
        match self.pipeline.execute(ctx).await {
            Ok(()) => Ok(Outcome::Completed),
            Err(err) => {
                if self.recovery.recover(&err).await {
                    Ok(Outcome::Recovered)
                } else {
                    Err(err)
                }
            }
        }
    }

    /// Resolves a service. A failing constructor is handed to the recovery
    /// manager and yields `None` if recovered; every other resolution error is
    /// returned as is. Under a USE_DEFAULT strategy the substitute is available
    /// from [`ErrorRecoveryManager::default_value`].
    pub async fn resolve<T: Send + Sync + 'static>(&self, token: &Token<T>) -> Result<Option<Arc<T>>> {
        match self.container.resolve(token) {
            Ok(instance) => Ok(Some(instance)),
            Err(err @ Error::Di(DiError::ConstructionFailed { .. })) => {
                if self.recovery.recover(&err).await {
                    Ok(None)
                } else {
                    Err(err)
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Uninstalls plugins (reverse install order), then shuts managers down
    /// in reverse initialization order. Every step runs; the first failure is
    /// returned. Afterwards every manager counts as uninitialized, so a later
    /// [`bootstrap`](Kernel::bootstrap) starts them again.
    pub async fn shutdown(&mut self) -> Result<()> {
        log::info!("Shutting down kernel...");
        let mut first_error: Option<Error> = None;

        let context = PluginContext::new(
            &self.container,
            &self.pipeline,
            &self.recovery,
            &self.config,
            &self.components,
            &self.managers,
        );
        if let Err(err) = self.plugins.uninstall_all(&context).await {
            first_error.get_or_insert(err);
        }

        for name in self.managers.init_order().iter().rev() {
            let Some(manager) = self.components.get(name) else {
                continue;
            };
            log::info!("Stopping manager: {}", name);
            if let Err(err) = manager.shutdown().await {
                log::error!("Error stopping manager {}: {}", name, err);
                first_error.get_or_insert(Error::lifecycle(
                    KernelLifecyclePhase::Shutdown,
                    Some(name),
                    "Manager failed to stop",
                    Some(err),
                ));
            }
        }

        self.managers.reset_initialization();
        self.bootstrapped = false;
        match first_error {
            Some(err) => Err(err),
            None => {
                log::info!("Kernel shutdown complete");
                Ok(())
            }
        }
    }

    /// The capability bundle plugins receive, for hosts that drive plugin
    /// hooks themselves.
    pub fn plugin_context(&self) -> PluginContext<'_> {
        PluginContext::new(
            &self.container,
            &self.pipeline,
            &self.recovery,
            &self.config,
            &self.components,
            &self.managers,
        )
    }

    /// Gets an initialized manager by its concrete type.
    pub fn manager_of<T: Manager>(&self) -> Option<Arc<T>> {
        self.plugin_context().manager_of::<T>()
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn managers(&self) -> &ManagerRegistry {
        &self.managers
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn plugins(&self) -> &PluginSystem {
        &self.plugins
    }

    pub fn container(&self) -> &DiContainer {
        &self.container
    }

    pub fn pipeline(&self) -> &MiddlewarePipeline {
        &self.pipeline
    }

    pub fn recovery(&self) -> &Arc<ErrorRecoveryManager> {
        &self.recovery
    }
}
