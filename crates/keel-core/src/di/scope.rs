use std::sync::{Arc, Mutex};

use crate::di::container::DiContainer;
use crate::di::resolver::{AnyInstance, InstanceMap, downcast};
use crate::di::token::Token;
use crate::kernel::error::Result;

/// Child resolution context with its own cache for scoped services.
/// Singletons still come from the parent container.
pub struct Scope {
    container: DiContainer,
    instances: Mutex<InstanceMap>,
}

impl Scope {
    pub(crate) fn new(container: DiContainer) -> Self {
        Self {
            container,
            instances: Mutex::new(InstanceMap::new()),
        }
    }

    pub fn resolve<T: Send + Sync + 'static>(&self, token: &Token<T>) -> Result<Arc<T>> {
        let instance = self.resolve_any(token.name())?;
        downcast(token.name(), instance)
    }

    pub fn resolve_any(&self, name: &str) -> Result<AnyInstance> {
        self.container.resolve_in(&self.instances, name)
    }

    pub fn container(&self) -> &DiContainer {
        &self.container
    }

    /// Whether a scoped instance for `name` is cached here.
    pub fn contains(&self, name: &str) -> bool {
        self.instances.lock().unwrap_or_else(|e| e.into_inner()).contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.instances.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every scoped instance; the next resolution constructs anew.
    pub fn clear(&self) {
        self.instances.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Ends the scope.
    pub fn dispose(self) {
        log::trace!("Disposing scope with {} cached instance(s)", self.len());
        self.clear();
    }
}
