// Plugin system test modules
#[cfg(test)]
mod context_tests;

use std::sync::Arc;

use crate::config::KernelConfig;
use crate::di::DiContainer;
use crate::kernel::component::ComponentRegistry;
use crate::manager::ManagerRegistry;
use crate::middleware::MiddlewarePipeline;
use crate::plugin_system::PluginContext;
use crate::recovery::ErrorRecoveryManager;

/// Owns everything a [`PluginContext`] borrows.
#[derive(Default)]
pub(super) struct Host {
    pub container: DiContainer,
    pub pipeline: MiddlewarePipeline,
    pub recovery: Arc<ErrorRecoveryManager>,
    pub config: KernelConfig,
    pub components: ComponentRegistry,
    pub managers: ManagerRegistry,
}

impl Host {
    pub fn context(&self) -> PluginContext<'_> {
        PluginContext::new(
            &self.container,
            &self.pipeline,
            &self.recovery,
            &self.config,
            &self.components,
            &self.managers,
        )
    }
}
