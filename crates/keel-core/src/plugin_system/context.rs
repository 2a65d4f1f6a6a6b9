use std::sync::Arc;

use crate::config::KernelConfig;
use crate::di::DiContainer;
use crate::kernel::component::ComponentRegistry;
use crate::manager::{Manager, ManagerRegistry};
use crate::middleware::MiddlewarePipeline;
use crate::recovery::ErrorRecoveryManager;

/// Capability bundle handed to plugin install and uninstall hooks.
///
/// Everything is borrowed from the host; a plugin can register services and
/// middleware (both take `&self`) but cannot replace the collaborators.
#[derive(Clone, Copy)]
pub struct PluginContext<'a> {
    container: &'a DiContainer,
    pipeline: &'a MiddlewarePipeline,
    recovery: &'a ErrorRecoveryManager,
    config: &'a KernelConfig,
    components: &'a ComponentRegistry,
    managers: &'a ManagerRegistry,
}

impl<'a> PluginContext<'a> {
    pub fn new(
        container: &'a DiContainer,
        pipeline: &'a MiddlewarePipeline,
        recovery: &'a ErrorRecoveryManager,
        config: &'a KernelConfig,
        components: &'a ComponentRegistry,
        managers: &'a ManagerRegistry,
    ) -> Self {
        Self {
            container,
            pipeline,
            recovery,
            config,
            components,
            managers,
        }
    }

    pub fn container(&self) -> &'a DiContainer {
        self.container
    }

    pub fn pipeline(&self) -> &'a MiddlewarePipeline {
        self.pipeline
    }

    pub fn recovery(&self) -> &'a ErrorRecoveryManager {
        self.recovery
    }

    pub fn config(&self) -> &'a KernelConfig {
        self.config
    }

    /// An initialized manager by name. Managers that are registered but not
    /// (yet) initialized are not handed out.
    pub fn manager(&self, name: &str) -> Option<Arc<dyn Manager>> {
        if !self.managers.is_initialized(name) {
            return None;
        }
        self.components.get(name)
    }

    /// An initialized manager by concrete type.
    pub fn manager_of<T: Manager>(&self) -> Option<Arc<T>> {
        let manager = self.components.get_concrete::<T>()?;
        self.managers.is_initialized(manager.name()).then_some(manager)
    }
}
