use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::manager::Manager;

/// Owns the manager instances registered with the kernel, keyed by name and
/// kept in registration order.
#[derive(Default, Debug)]
pub struct ComponentRegistry {
    instances: Vec<Arc<dyn Manager>>,
    index: HashMap<String, usize>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a manager instance. Returns `false` if the name is taken.
    pub fn register(&mut self, instance: Arc<dyn Manager>) -> bool {
        let name = instance.name().to_string();
        if self.index.contains_key(&name) {
            return false;
        }
        self.index.insert(name, self.instances.len());
        self.instances.push(instance);
        true
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Manager>> {
        self.index.get(name).map(|&i| self.instances[i].clone())
    }

    /// Get a manager instance by concrete type T.
    pub fn get_concrete<T: Manager>(&self) -> Option<Arc<T>> {
        self.instances.iter().find_map(|instance| {
            let arc_any: Arc<dyn Any + Send + Sync> = instance.clone();
            Arc::downcast::<T>(arc_any).ok()
        })
    }

    /// All instances in registration order.
    pub fn all(&self) -> Vec<Arc<dyn Manager>> {
        self.instances.clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.index.clear();
    }
}
