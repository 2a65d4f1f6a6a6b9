use std::any::Any;
use std::collections::HashMap;

/// Request state threaded through one pipeline run.
#[derive(Default)]
pub struct MiddlewareContext {
    /// Shared data between middleware
    data: HashMap<String, Box<dyn Any + Send + Sync>>,

    /// String metadata, e.g. request identifiers
    metadata: HashMap<String, String>,

    /// Names of the entries that were entered, in order
    trail: Vec<String>,

    reached_end: bool,
}

impl MiddlewareContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data<T: 'static + Send + Sync>(&mut self, key: &str, value: T) {
        self.data.insert(key.to_string(), Box::new(value));
    }

    pub fn get_data<T: 'static + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.data.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn get_data_mut<T: 'static + Send + Sync>(&mut self, key: &str) -> Option<&mut T> {
        self.data.get_mut(key).and_then(|v| v.downcast_mut::<T>())
    }

    pub fn remove_data(&mut self, key: &str) -> bool {
        self.data.remove(key).is_some()
    }

    pub fn has_data(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn set_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Entries that ran during the last `execute`, outermost first.
    pub fn trail(&self) -> &[String] {
        &self.trail
    }

    /// After `execute`: true if some entry did not call `next`, so the end
    /// of the chain was never reached.
    pub fn is_halted(&self) -> bool {
        !self.reached_end
    }

    pub(crate) fn enter(&mut self, name: &str) {
        self.trail.push(name.to_string());
    }

    pub(crate) fn mark_end(&mut self) {
        self.reached_end = true;
    }

    pub(crate) fn reset_run(&mut self) {
        self.trail.clear();
        self.reached_end = false;
    }
}
